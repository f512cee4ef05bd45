// error.rs: Error types for the habit goal lifecycle.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during goal lifecycle operations.
///
/// `Validation`, `Conflict` and `NoHistory` are user-correctable: the caller
/// reports them and waits for new input. `IoError` and `SerializationError`
/// come from the backing store.
#[derive(Debug, Error)]
pub enum GoalError {
    /// A required field is missing or a numeric input is out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A goal is already active; it must be completed or deleted first.
    #[error("goal {0} is still active; complete or delete it before setting a new one")]
    Conflict(Uuid),

    /// Undo was requested but no increments have been recorded.
    #[error("nothing to undo")]
    NoHistory,

    /// The operation is not accepted in the current lifecycle state.
    #[error("cannot {operation} while goal is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize goal data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GoalError {
    /// True for errors the user can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GoalError::Validation(_)
                | GoalError::Conflict(_)
                | GoalError::NoHistory
                | GoalError::InvalidState { .. }
        )
    }
}
