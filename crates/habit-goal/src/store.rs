// store.rs: Persistence for the three habit records.
//
// State is kept as three independent keyed records:
//   goal         the active HabitGoal, absent when none
//   increments   deltas recorded against the active goal
//   archive      finished goal snapshots in completion order
//
// FileGoalStore writes each record as a JSON file in one directory, which
// keeps the data easy to inspect and back up by hand. MemoryGoalStore holds
// the same records in process.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GoalError;
use crate::goal::HabitGoal;

const GOAL_FILE: &str = "goal.json";
const INCREMENTS_FILE: &str = "increments.json";
const ARCHIVE_FILE: &str = "archive.json";

/// Backing storage for a goal session.
///
/// Absent records load as empty. Saving an empty increments or archive
/// record may remove it entirely.
pub trait GoalStore {
    fn load_goal(&self) -> Result<Option<HabitGoal>, GoalError>;
    fn save_goal(&mut self, goal: &HabitGoal) -> Result<(), GoalError>;
    fn clear_goal(&mut self) -> Result<(), GoalError>;

    fn load_increments(&self) -> Result<Vec<f64>, GoalError>;
    fn save_increments(&mut self, deltas: &[f64]) -> Result<(), GoalError>;

    fn load_archive(&self) -> Result<Vec<HabitGoal>, GoalError>;
    fn save_archive(&mut self, entries: &[HabitGoal]) -> Result<(), GoalError>;
}

/// JSON file store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileGoalStore {
    store_dir: PathBuf,
}

impl FileGoalStore {
    /// Create a new store backed by the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(store_dir: impl AsRef<Path>) -> Result<Self, GoalError> {
        let store_dir = store_dir.as_ref().to_path_buf();
        fs::create_dir_all(&store_dir).map_err(|source| GoalError::IoError {
            path: store_dir.display().to_string(),
            source,
        })?;
        Ok(Self { store_dir })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.store_dir.join(name)
    }

    fn read_record<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, GoalError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| GoalError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write_record<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), GoalError> {
        let path = self.record_path(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).map_err(|source| GoalError::IoError {
            path: path.display().to_string(),
            source,
        })
    }

    fn remove_record(&self, name: &str) -> Result<(), GoalError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|source| GoalError::IoError {
            path: path.display().to_string(),
            source,
        })
    }
}

impl GoalStore for FileGoalStore {
    fn load_goal(&self) -> Result<Option<HabitGoal>, GoalError> {
        self.read_record(GOAL_FILE)
    }

    fn save_goal(&mut self, goal: &HabitGoal) -> Result<(), GoalError> {
        self.write_record(GOAL_FILE, goal)
    }

    fn clear_goal(&mut self) -> Result<(), GoalError> {
        self.remove_record(GOAL_FILE)
    }

    fn load_increments(&self) -> Result<Vec<f64>, GoalError> {
        Ok(self.read_record(INCREMENTS_FILE)?.unwrap_or_default())
    }

    fn save_increments(&mut self, deltas: &[f64]) -> Result<(), GoalError> {
        if deltas.is_empty() {
            return self.remove_record(INCREMENTS_FILE);
        }
        self.write_record(INCREMENTS_FILE, deltas)
    }

    fn load_archive(&self) -> Result<Vec<HabitGoal>, GoalError> {
        Ok(self.read_record(ARCHIVE_FILE)?.unwrap_or_default())
    }

    fn save_archive(&mut self, entries: &[HabitGoal]) -> Result<(), GoalError> {
        self.write_record(ARCHIVE_FILE, entries)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryGoalStore {
    goal: Option<HabitGoal>,
    increments: Vec<f64>,
    archive: Vec<HabitGoal>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GoalStore for MemoryGoalStore {
    fn load_goal(&self) -> Result<Option<HabitGoal>, GoalError> {
        Ok(self.goal.clone())
    }

    fn save_goal(&mut self, goal: &HabitGoal) -> Result<(), GoalError> {
        self.goal = Some(goal.clone());
        Ok(())
    }

    fn clear_goal(&mut self) -> Result<(), GoalError> {
        self.goal = None;
        Ok(())
    }

    fn load_increments(&self) -> Result<Vec<f64>, GoalError> {
        Ok(self.increments.clone())
    }

    fn save_increments(&mut self, deltas: &[f64]) -> Result<(), GoalError> {
        self.increments = deltas.to_vec();
        Ok(())
    }

    fn load_archive(&self) -> Result<Vec<HabitGoal>, GoalError> {
        Ok(self.archive.clone())
    }

    fn save_archive(&mut self, entries: &[HabitGoal]) -> Result<(), GoalError> {
        self.archive = entries.to_vec();
        Ok(())
    }
}
