// goal_flow.rs: End-to-end test of one goal from creation to archive.
//
// Flow:
//   1. Open a session over an on-disk store with an event log attached
//   2. Create "read ten books" → total 10, unit "books"
//   3. Record progress, overshoot the total, undo, finish it
//   4. Broaden the completed goal, then edit it back down to progress
//   5. Replace it with a new goal → the finished one lands in the archive
//   6. Delete the new goal while incomplete → nothing archived
//   7. Reopen the store and delete the archive entry
//
// VERIFY:
//   - Progress stays within [0, total] at every step
//   - Only completed goals reach the archive, each with finished_at set
//   - The event log has one line per lifecycle event, in order
//   - State survives closing and reopening the session

use std::fs;

use habit_goal::{
    FileGoalStore, GoalDraft, GoalEdit, GoalError, GoalSession, GoalState, HabitConfig,
    HabitEvent, LogSink,
};
use tempfile::tempdir;

fn assert_in_bounds(session: &GoalSession<FileGoalStore>) {
    if let Some(goal) = session.goal() {
        assert!(goal.progress >= 0.0, "negative progress: {}", goal.progress);
        assert!(
            goal.progress <= goal.total,
            "progress {} above total {}",
            goal.progress,
            goal.total
        );
    }
}

#[test]
fn goal_lifecycle_create_to_archive() {
    let data_dir = tempdir().unwrap();
    let config = HabitConfig::for_data_dir(data_dir.path());

    // =========================================================
    // 1. Open session with the event log
    // =========================================================

    let store = FileGoalStore::new(&config.store_dir).unwrap();
    let mut session = GoalSession::open(store).unwrap();
    session.add_sink(Box::new(LogSink::new(&config.events_log)));
    assert_eq!(session.state(), GoalState::Empty);

    // =========================================================
    // 2. Create the goal
    // =========================================================

    let draft = GoalDraft::new("read ten books", "the end of summer", "read", "before bed")
        .with_specific("I will start reading at 9 p.m. and read for one hour");
    let goal = session.create(&draft).unwrap();
    assert_eq!(goal.total, 10.0);
    assert_eq!(goal.unit, "books");
    let first_id = goal.id;

    // =========================================================
    // 3. Progress, overshoot, undo, finish
    // =========================================================

    session.record_progress(3.0).unwrap();
    session.record_progress(4.5).unwrap();
    assert_in_bounds(&session);

    let clipped = session.record_progress(100.0).unwrap();
    assert_eq!(clipped, 2.5);
    assert_eq!(session.state(), GoalState::Completed);
    assert_in_bounds(&session);

    assert_eq!(session.undo().unwrap(), 2.5);
    assert_eq!(session.goal().unwrap().progress, 7.5);
    assert_eq!(session.state(), GoalState::Active);

    session.record_progress(2.5).unwrap();
    assert_eq!(session.state(), GoalState::Completed);

    // =========================================================
    // 4. Broaden, then edit back down
    // =========================================================

    assert!(matches!(
        session.broaden(10.0, "same total"),
        Err(GoalError::Validation(_))
    ));
    session.broaden(12.0, "two bonus books").unwrap();
    assert_eq!(session.state(), GoalState::Active);
    assert_eq!(session.goal().unwrap().progress, 10.0);

    let mut edit = GoalEdit::from_goal(session.goal().unwrap());
    edit.total = 9.0;
    assert!(matches!(session.edit(&edit), Err(GoalError::Validation(_))));
    edit.total = 10.0;
    session.edit(&edit).unwrap();
    assert_eq!(session.state(), GoalState::Completed);
    assert_in_bounds(&session);

    // =========================================================
    // 5. Replace with a new goal
    // =========================================================

    let next = GoalDraft::new("run 5 km", "next week", "run", "every morning");
    let archived = session.replace(&next).unwrap().unwrap();
    assert_eq!(archived.id, first_id);
    assert!(archived.finished_at.is_some());
    assert_eq!(session.archive().len(), 1);
    assert!(session.increments().is_empty());
    assert_eq!(session.goal().unwrap().unit, "km");

    // =========================================================
    // 6. Abandon the new goal
    // =========================================================

    session.record_progress(1.0).unwrap();
    assert!(session.delete_goal().unwrap().is_none());
    assert_eq!(session.archive().len(), 1);
    assert_eq!(session.state(), GoalState::Empty);

    session.close().unwrap();

    // =========================================================
    // 7. Reopen and clean up the archive
    // =========================================================

    let store = FileGoalStore::new(&config.store_dir).unwrap();
    let mut session = GoalSession::open(store).unwrap();
    assert_eq!(session.state(), GoalState::Empty);
    assert_eq!(session.archive().len(), 1);
    assert!(session.archive_delete(first_id).unwrap());
    assert!(!session.archive_delete(first_id).unwrap());
    session.close().unwrap();

    // =========================================================
    // VERIFY: the event log
    // =========================================================

    let log = fs::read_to_string(&config.events_log).unwrap();
    let events: Vec<HabitEvent> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e.event_type()).collect();

    assert_eq!(kinds.first(), Some(&"goal_created"));
    assert_eq!(
        kinds.iter().filter(|k| **k == "goal_archived").count(),
        1
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == "goal_discarded").count(),
        1
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == "progress_recorded").count(),
        5
    );
    // The second session wrote no events: no sink was attached.
    assert_ne!(kinds.last(), Some(&"archive_entry_deleted"));
}

#[test]
fn second_goal_is_refused_until_first_is_gone() {
    let data_dir = tempdir().unwrap();
    let store = FileGoalStore::new(data_dir.path()).unwrap();
    let mut session = GoalSession::open(store).unwrap();

    let draft = GoalDraft::new("meditate", "daily", "sit", "for ten minutes");
    session.create(&draft).unwrap();
    let id = session.goal().unwrap().id;

    let other = GoalDraft::new("read 10 books", "june", "read", "nightly");
    assert!(matches!(session.create(&other), Err(GoalError::Conflict(_))));
    assert_eq!(session.goal().unwrap().id, id);

    session.delete_goal().unwrap();
    session.create(&other).unwrap();
    assert_eq!(session.goal().unwrap().total, 10.0);
}
