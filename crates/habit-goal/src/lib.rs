//! # habit-goal
//!
//! One habit goal at a time: create it, record progress toward its total,
//! undo mistakes, broaden it once done, and keep finished goals in an
//! archive.
//!
//! ## Key components
//!
//! - [`parse_target`]: derives `(total, unit)` from free text such as
//!   "read 10 books" or "read ten books"
//! - [`GoalSession`]: the lifecycle state machine (Empty → Active →
//!   Completed → Empty) over a persisted goal slot
//! - [`GoalStore`]: storage for the goal, increment and archive records,
//!   with [`FileGoalStore`] (JSON files) and [`MemoryGoalStore`]
//! - [`HabitEvent`] / [`EventDispatcher`]: lifecycle events for sinks such
//!   as the JSONL [`LogSink`]
//! - [`HabitConfig`]: data directory layout and `habit.toml` settings

pub mod archive;
pub mod config;
pub mod error;
pub mod events;
pub mod goal;
pub mod history;
pub mod lifecycle;
pub mod store;
pub mod target;

pub use archive::HistoryArchive;
pub use config::{HabitConfig, HabitSettings};
pub use error::GoalError;
pub use events::{EventDispatcher, HabitEvent, LogSink, NotificationSink};
pub use goal::{round2, GoalDraft, GoalEdit, GoalState, HabitGoal};
pub use history::IncrementHistory;
pub use lifecycle::GoalSession;
pub use store::{FileGoalStore, GoalStore, MemoryGoalStore};
pub use target::{parse_target, ParsedTarget};
