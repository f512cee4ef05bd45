// lifecycle.rs: GoalSession: the single-goal state machine.
//
// A session owns the active goal slot, the increment history for that goal
// and the archive of finished goals. `open()` loads all three from a store;
// every mutation validates, computes the next state, writes it to the store
// and only then commits it in memory. When a later write of the same
// operation fails, the earlier ones are restored, so a failed write leaves
// both the session and the store as they were. `close()` flushes everything
// and hands the store back.
//
//   Empty ──create──▶ Active ──record_progress──▶ Completed
//     ▲                 ▲  ◀──undo / edit / broaden──┘
//     └──delete_goal / set_new_goal──────────────────┘
//
// A goal is archived only if its progress had reached its total at the
// moment it was deleted or replaced. Incomplete goals vanish.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::archive::HistoryArchive;
use crate::error::GoalError;
use crate::events::{EventDispatcher, HabitEvent, NotificationSink};
use crate::goal::{round2, GoalDraft, GoalEdit, GoalState, HabitGoal};
use crate::history::IncrementHistory;
use crate::store::GoalStore;

/// One user's habit state, loaded from and mirrored to a [`GoalStore`].
#[derive(Debug)]
pub struct GoalSession<S: GoalStore> {
    store: S,
    goal: Option<HabitGoal>,
    increments: IncrementHistory,
    archive: HistoryArchive,
    dispatcher: EventDispatcher,
}

impl<S: GoalStore> GoalSession<S> {
    /// Load a session with an unbounded undo history.
    pub fn open(store: S) -> Result<Self, GoalError> {
        Self::open_with_limit(store, None)
    }

    /// Load a session keeping at most `undo_limit` increments for undo.
    pub fn open_with_limit(store: S, undo_limit: Option<usize>) -> Result<Self, GoalError> {
        let goal = store.load_goal()?;
        let mut increments = IncrementHistory::from_deltas(store.load_increments()?, undo_limit);
        let archive = HistoryArchive::from_entries(store.load_archive()?);

        // Increments only ever describe the active goal.
        if goal.is_none() && !increments.is_empty() {
            debug!(count = increments.len(), "dropping increments left without a goal");
            increments.clear();
        }

        debug!(
            state = %GoalState::of(goal.as_ref()),
            increments = increments.len(),
            archived = archive.len(),
            "goal session opened"
        );

        Ok(Self {
            store,
            goal,
            increments,
            archive,
            dispatcher: EventDispatcher::new(),
        })
    }

    /// Attach a sink for lifecycle events.
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.dispatcher.add_sink(sink);
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn state(&self) -> GoalState {
        GoalState::of(self.goal.as_ref())
    }

    pub fn goal(&self) -> Option<&HabitGoal> {
        self.goal.as_ref()
    }

    pub fn increments(&self) -> &IncrementHistory {
        &self.increments
    }

    pub fn archive(&self) -> &HistoryArchive {
        &self.archive
    }

    pub fn can_undo(&self) -> bool {
        self.goal.is_some() && !self.increments.is_empty()
    }

    /// Amount left to complete the active goal.
    pub fn remaining(&self) -> Option<f64> {
        self.goal.as_ref().map(HabitGoal::remaining)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Create the active goal from a draft. Refused while a goal exists.
    pub fn create(&mut self, draft: &GoalDraft) -> Result<&HabitGoal, GoalError> {
        if let Some(existing) = &self.goal {
            return Err(GoalError::Conflict(existing.id));
        }
        let goal = HabitGoal::from_draft(draft)?;

        let fresh = IncrementHistory::with_limit(self.increments.limit());
        let (from, to) = self.commit(goal.clone(), Some(fresh))?;

        info!(goal_id = %goal.id, total = goal.total, unit = %goal.unit, "goal created");
        self.emit(HabitEvent::goal_created(&goal));
        self.emit_transition(goal.id, from, to);

        self.current()
    }

    /// Add `amount` to the active goal's progress. Amounts beyond what is
    /// left are clipped; the applied delta is returned and remembered for
    /// undo.
    pub fn record_progress(&mut self, amount: f64) -> Result<f64, GoalError> {
        let mut next = self
            .require("record progress", &[GoalState::Active])?
            .clone();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GoalError::Validation(format!(
                "please enter a positive number, got {}",
                amount
            )));
        }

        let remaining = next.total - next.progress;
        let delta = amount.min(remaining);
        next.progress = if amount >= remaining {
            next.total
        } else {
            round2(next.progress + delta).min(next.total)
        };

        let mut increments = self.increments.clone();
        increments.push(delta);

        let goal_id = next.id;
        let (progress, total) = (next.progress, next.total);
        let (from, to) = self.commit(next, Some(increments))?;

        info!(%goal_id, requested = amount, delta, progress, total, "progress recorded");
        self.emit(HabitEvent::ProgressRecorded {
            goal_id,
            requested: amount,
            delta,
            progress,
            total,
            timestamp: chrono::Utc::now(),
        });
        self.emit_transition(goal_id, from, to);

        Ok(delta)
    }

    /// Take back the most recent increment. Returns the removed delta.
    pub fn undo(&mut self) -> Result<f64, GoalError> {
        let delta = self.increments.last().ok_or(GoalError::NoHistory)?;
        let mut next = self.goal.clone().ok_or(GoalError::NoHistory)?;

        next.progress = round2(next.progress - delta).max(0.0);
        let mut increments = self.increments.clone();
        increments.pop();

        let goal_id = next.id;
        let progress = next.progress;
        let (from, to) = self.commit(next, Some(increments))?;

        info!(%goal_id, delta, progress, "progress undone");
        self.emit(HabitEvent::ProgressUndone {
            goal_id,
            delta,
            progress,
            timestamp: chrono::Utc::now(),
        });
        self.emit_transition(goal_id, from, to);

        Ok(delta)
    }

    /// Raise a completed goal's total so tracking can continue. Progress
    /// and increments carry over.
    pub fn broaden(
        &mut self,
        new_total: f64,
        new_specific: impl Into<String>,
    ) -> Result<&HabitGoal, GoalError> {
        let mut next = self.require("broaden", &[GoalState::Completed])?.clone();
        if !new_total.is_finite() || new_total <= next.total {
            return Err(GoalError::Validation(format!(
                "please enter a number greater than the current total ({})",
                next.total
            )));
        }

        let previous_total = next.total;
        next.total = new_total;
        next.specific = new_specific.into();

        let goal_id = next.id;
        let (from, to) = self.commit(next, None)?;

        info!(%goal_id, previous_total, total = new_total, "goal broadened");
        self.emit(HabitEvent::GoalBroadened {
            goal_id,
            previous_total,
            total: new_total,
            timestamp: chrono::Utc::now(),
        });
        self.emit_transition(goal_id, from, to);

        self.current()
    }

    /// Overwrite the goal's descriptive fields, total and unit. The total
    /// may shrink down to, but not below, current progress.
    pub fn edit(&mut self, edit: &GoalEdit) -> Result<&HabitGoal, GoalError> {
        let mut next = self
            .require("edit", &[GoalState::Active, GoalState::Completed])?
            .clone();
        edit.validate(next.progress)?;
        next.apply_edit(edit);

        let goal_id = next.id;
        let (from, to) = self.commit(next, None)?;

        info!(%goal_id, total = edit.total, "goal edited");
        self.emit(HabitEvent::GoalEdited {
            goal_id,
            total: edit.total,
            timestamp: chrono::Utc::now(),
        });
        self.emit_transition(goal_id, from, to);

        self.current()
    }

    /// Remove the active goal. A completed goal is archived first; the
    /// archived snapshot is returned.
    pub fn delete_goal(&mut self) -> Result<Option<HabitGoal>, GoalError> {
        self.require("delete the goal", &[GoalState::Active, GoalState::Completed])?;
        self.retire()
    }

    /// Clear the slot for a new goal, archiving the current one if it was
    /// completed. Accepted when the slot is already empty.
    pub fn set_new_goal(&mut self) -> Result<Option<HabitGoal>, GoalError> {
        if self.goal.is_none() {
            if !self.increments.is_empty() {
                self.store.save_increments(&[])?;
                self.increments.clear();
            }
            return Ok(None);
        }
        self.retire()
    }

    /// `set_new_goal` followed by `create`. The draft is validated up front
    /// so a bad draft never costs the current goal.
    pub fn replace(&mut self, draft: &GoalDraft) -> Result<Option<HabitGoal>, GoalError> {
        draft.validate()?;
        let archived = self.set_new_goal()?;
        self.create(draft)?;
        Ok(archived)
    }

    /// Delete one archive entry. Returns whether anything was removed.
    pub fn archive_delete(&mut self, id: Uuid) -> Result<bool, GoalError> {
        if !self.archive.contains(id) {
            return Ok(false);
        }
        let mut archive = self.archive.clone();
        archive.remove(id);
        self.store.save_archive(archive.entries())?;
        self.archive = archive;

        info!(goal_id = %id, "archive entry deleted");
        self.emit(HabitEvent::ArchiveEntryDeleted {
            goal_id: id,
            timestamp: chrono::Utc::now(),
        });
        Ok(true)
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// Write all three records to the store.
    pub fn flush(&mut self) -> Result<(), GoalError> {
        match &self.goal {
            Some(goal) => self.store.save_goal(goal)?,
            None => self.store.clear_goal()?,
        }
        self.store.save_increments(&self.increments.to_vec())?;
        self.store.save_archive(self.archive.entries())?;
        Ok(())
    }

    /// Flush and give back the store.
    pub fn close(mut self) -> Result<S, GoalError> {
        self.flush()?;
        Ok(self.store)
    }

    // ── Internals ────────────────────────────────────────────────

    fn require(
        &self,
        operation: &'static str,
        allowed: &[GoalState],
    ) -> Result<&HabitGoal, GoalError> {
        let state = self.state();
        match &self.goal {
            Some(goal) if allowed.contains(&state) => Ok(goal),
            _ => Err(GoalError::InvalidState {
                operation,
                state: state.to_string(),
            }),
        }
    }

    fn current(&self) -> Result<&HabitGoal, GoalError> {
        self.goal.as_ref().ok_or(GoalError::InvalidState {
            operation: "read the goal",
            state: GoalState::Empty.to_string(),
        })
    }

    /// Persist `next` (and `increments`, if given), then make them current.
    /// Returns the state before and after.
    fn commit(
        &mut self,
        next: HabitGoal,
        increments: Option<IncrementHistory>,
    ) -> Result<(GoalState, GoalState), GoalError> {
        if let Some(increments) = &increments {
            self.store.save_increments(&increments.to_vec())?;
        }
        if let Err(e) = self.store.save_goal(&next) {
            if increments.is_some() {
                let previous = self.increments.to_vec();
                self.rollback("increments", |store| store.save_increments(&previous));
            }
            return Err(e);
        }

        let from = self.state();
        let to = next.state();
        self.goal = Some(next);
        if let Some(increments) = increments {
            self.increments = increments;
        }
        Ok((from, to))
    }

    /// Archive-if-complete, then clear the goal and its increments.
    fn retire(&mut self) -> Result<Option<HabitGoal>, GoalError> {
        let Some(goal) = self.goal.clone() else {
            return Ok(None);
        };

        // An id already in the archive is never added twice.
        let snapshot = (goal.is_complete() && !self.archive.contains(goal.id))
            .then(|| goal.finished_snapshot());
        let mut archive = self.archive.clone();
        if let Some(snapshot) = &snapshot {
            archive.push(snapshot.clone());
            self.store.save_archive(archive.entries())?;
        }

        if let Err(e) = self.store.clear_goal() {
            if snapshot.is_some() {
                let previous = self.archive.entries().to_vec();
                self.rollback("archive", |store| store.save_archive(&previous));
            }
            return Err(e);
        }
        if let Err(e) = self.store.save_increments(&[]) {
            self.rollback("goal", |store| store.save_goal(&goal));
            if snapshot.is_some() {
                let previous = self.archive.entries().to_vec();
                self.rollback("archive", |store| store.save_archive(&previous));
            }
            return Err(e);
        }

        self.archive = archive;
        self.goal = None;
        self.increments.clear();

        match &snapshot {
            Some(snapshot) => {
                info!(goal_id = %goal.id, "goal archived");
                self.emit(HabitEvent::goal_archived(snapshot));
            }
            None => {
                info!(goal_id = %goal.id, progress = goal.progress, total = goal.total, "goal discarded");
                self.emit(HabitEvent::goal_discarded(&goal));
            }
        }
        self.emit_transition(goal.id, goal.state(), GoalState::Empty);

        Ok(snapshot)
    }

    /// Restore a record after a later write in the same operation failed.
    fn rollback(
        &mut self,
        record: &'static str,
        restore: impl FnOnce(&mut S) -> Result<(), GoalError>,
    ) {
        if let Err(e) = restore(&mut self.store) {
            warn!(record, "could not restore record after failed write: {}", e);
        }
    }

    fn emit(&self, event: HabitEvent) {
        self.dispatcher.dispatch(&event);
    }

    fn emit_transition(&self, goal_id: Uuid, from: GoalState, to: GoalState) {
        if from != to {
            debug!(%goal_id, %from, %to, "goal state changed");
            self.emit(HabitEvent::goal_state_changed(goal_id, from, to));
        }
    }
}
