// events.rs: Lifecycle events and notification dispatch.
//
// Every successful mutation of a goal session emits a HabitEvent. Sinks
// subscribe to them; the always-on sink is a JSONL activity log next to
// the store. Dispatch is synchronous and a failing sink never fails the
// operation that produced the event.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;
use crate::goal::{GoalState, HabitGoal};

/// Events emitted at goal lifecycle points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum HabitEvent {
    /// A new goal was created.
    GoalCreated {
        goal_id: Uuid,
        target: String,
        total: f64,
        unit: String,
        timestamp: DateTime<Utc>,
    },

    /// Progress was recorded. `delta` is the applied (possibly clipped) amount.
    ProgressRecorded {
        goal_id: Uuid,
        requested: f64,
        delta: f64,
        progress: f64,
        total: f64,
        timestamp: DateTime<Utc>,
    },

    /// The most recent increment was undone.
    ProgressUndone {
        goal_id: Uuid,
        delta: f64,
        progress: f64,
        timestamp: DateTime<Utc>,
    },

    /// A completed goal's total was raised.
    GoalBroadened {
        goal_id: Uuid,
        previous_total: f64,
        total: f64,
        timestamp: DateTime<Utc>,
    },

    /// Goal fields were edited.
    GoalEdited {
        goal_id: Uuid,
        total: f64,
        timestamp: DateTime<Utc>,
    },

    /// The goal moved between active and completed.
    GoalStateChanged {
        goal_id: Uuid,
        from_state: String,
        to_state: String,
        timestamp: DateTime<Utc>,
    },

    /// A completed goal was moved into the archive.
    GoalArchived {
        goal_id: Uuid,
        target: String,
        finished_at: DateTime<Utc>,
    },

    /// An incomplete goal was removed without being archived.
    GoalDiscarded {
        goal_id: Uuid,
        progress: f64,
        total: f64,
        timestamp: DateTime<Utc>,
    },

    /// An archived goal was deleted from the archive.
    ArchiveEntryDeleted {
        goal_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl HabitEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            HabitEvent::GoalCreated { .. } => "goal_created",
            HabitEvent::ProgressRecorded { .. } => "progress_recorded",
            HabitEvent::ProgressUndone { .. } => "progress_undone",
            HabitEvent::GoalBroadened { .. } => "goal_broadened",
            HabitEvent::GoalEdited { .. } => "goal_edited",
            HabitEvent::GoalStateChanged { .. } => "goal_state_changed",
            HabitEvent::GoalArchived { .. } => "goal_archived",
            HabitEvent::GoalDiscarded { .. } => "goal_discarded",
            HabitEvent::ArchiveEntryDeleted { .. } => "archive_entry_deleted",
        }
    }

    pub fn goal_created(goal: &HabitGoal) -> Self {
        HabitEvent::GoalCreated {
            goal_id: goal.id,
            target: goal.target.clone(),
            total: goal.total,
            unit: goal.unit.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_state_changed(goal_id: Uuid, from: GoalState, to: GoalState) -> Self {
        HabitEvent::GoalStateChanged {
            goal_id,
            from_state: from.to_string(),
            to_state: to.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_archived(snapshot: &HabitGoal) -> Self {
        HabitEvent::GoalArchived {
            goal_id: snapshot.id,
            target: snapshot.target.clone(),
            finished_at: snapshot.finished_at.unwrap_or_else(Utc::now),
        }
    }

    pub fn goal_discarded(goal: &HabitGoal) -> Self {
        HabitEvent::GoalDiscarded {
            goal_id: goal.id,
            progress: goal.progress,
            total: goal.total,
            timestamp: Utc::now(),
        }
    }
}

/// Receives habit events.
pub trait NotificationSink: Send {
    /// Handle an event. Errors are logged but don't stop the system.
    fn send(&self, event: &HabitEvent) -> Result<(), GoalError>;
}

/// Logs events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &HabitEvent) -> Result<(), GoalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GoalError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GoalError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| GoalError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Dispatches events to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the event.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn dispatch(&self, event: &HabitEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!(event = event.event_type(), "notification sink error: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::GoalDraft;
    use tempfile::tempdir;

    fn goal() -> HabitGoal {
        HabitGoal::from_draft(&GoalDraft::new("read 3 books", "june", "read", "daily")).unwrap()
    }

    #[test]
    fn event_serialization_round_trip() {
        let event = HabitEvent::goal_created(&goal());
        let json = serde_json::to_string(&event).unwrap();
        let restored: HabitEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.event_type(), restored.event_type());
        assert!(json.contains("\"goal_created\""));
    }

    #[test]
    fn log_sink_appends_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let sink = LogSink::new(&path);

        let g = goal();
        sink.send(&HabitEvent::goal_created(&g)).unwrap();
        sink.send(&HabitEvent::goal_discarded(&g)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("goal_discarded"));
    }

    #[test]
    fn dispatcher_sends_to_all_sinks() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("sink1.jsonl");
        let path2 = dir.path().join("sink2.jsonl");

        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(LogSink::new(&path1)));
        dispatcher.add_sink(Box::new(LogSink::new(&path2)));

        dispatcher.dispatch(&HabitEvent::goal_created(&goal()));

        assert!(fs::read_to_string(&path1).unwrap().contains("goal_created"));
        assert!(fs::read_to_string(&path2).unwrap().contains("goal_created"));
    }

    #[test]
    fn failing_sink_does_not_block_others() {
        let dir = tempdir().unwrap();
        // A directory where the log file should be makes the open fail.
        let blocked = dir.path().join("blocked");
        fs::create_dir_all(&blocked).unwrap();
        let ok_path = dir.path().join("ok.jsonl");

        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(LogSink::new(&blocked)));
        dispatcher.add_sink(Box::new(LogSink::new(&ok_path)));
        dispatcher.dispatch(&HabitEvent::goal_created(&goal()));

        assert!(ok_path.exists());
    }

    #[test]
    fn event_type_names() {
        let id = Uuid::new_v4();
        assert_eq!(
            HabitEvent::goal_state_changed(id, GoalState::Active, GoalState::Completed)
                .event_type(),
            "goal_state_changed"
        );
        let archived = HabitEvent::goal_archived(&goal().finished_snapshot());
        assert_eq!(archived.event_type(), "goal_archived");
    }
}
