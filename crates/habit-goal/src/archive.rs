// archive.rs: HistoryArchive: finished goals kept after deletion.
//
// Entries are stored in completion order. Listings for display are
// newest first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goal::HabitGoal;

/// Append-mostly log of finished goal snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryArchive {
    entries: Vec<HabitGoal>,
}

impl HistoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HabitGoal>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, snapshot: HabitGoal) {
        self.entries.push(snapshot);
    }

    /// Remove the entry with `id`. Returns the removed snapshot, if any.
    pub fn remove(&mut self, id: Uuid) -> Option<HabitGoal> {
        let index = self.entries.iter().position(|g| g.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&HabitGoal> {
        self.entries.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Completion order, oldest first.
    pub fn entries(&self) -> &[HabitGoal] {
        &self.entries
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &HabitGoal> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::GoalDraft;

    fn finished(target: &str) -> HabitGoal {
        let draft = GoalDraft::new(target, "soon", "do", "it");
        HabitGoal::from_draft(&draft).unwrap().finished_snapshot()
    }

    #[test]
    fn newest_first_reverses_completion_order() {
        let mut archive = HistoryArchive::new();
        archive.push(finished("run 1 mile"));
        archive.push(finished("run 2 miles"));
        let targets: Vec<&str> = archive.newest_first().map(|g| g.target.as_str()).collect();
        assert_eq!(targets, vec!["run 2 miles", "run 1 mile"]);
    }

    #[test]
    fn remove_by_id() {
        let mut archive = HistoryArchive::new();
        let keep = finished("keep");
        let drop = finished("drop");
        let drop_id = drop.id;
        archive.push(keep.clone());
        archive.push(drop);

        let removed = archive.remove(drop_id).unwrap();
        assert_eq!(removed.target, "drop");
        assert_eq!(archive.len(), 1);
        assert!(archive.contains(keep.id));
        assert!(!archive.contains(drop_id));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut archive = HistoryArchive::new();
        archive.push(finished("only"));
        assert!(archive.remove(Uuid::new_v4()).is_none());
        assert_eq!(archive.len(), 1);
    }
}
