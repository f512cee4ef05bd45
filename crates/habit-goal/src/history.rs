// history.rs: IncrementHistory: the deltas applied to the current goal.
//
// One entry per successful progress record, newest last. Undo pops the
// newest entry. The stack belongs to the current goal only and is cleared
// whenever that goal goes away.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Stack of applied progress deltas.
///
/// With a limit set, pushing onto a full stack forgets the oldest delta;
/// that increment can then no longer be undone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncrementHistory {
    deltas: VecDeque<f64>,
    #[serde(skip)]
    limit: Option<usize>,
}

impl IncrementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            deltas: VecDeque::new(),
            limit,
        }
    }

    /// Rebuild from persisted deltas, applying `limit` to what was loaded.
    pub fn from_deltas(deltas: impl IntoIterator<Item = f64>, limit: Option<usize>) -> Self {
        let mut history = Self::with_limit(limit);
        for delta in deltas {
            history.push(delta);
        }
        history
    }

    pub fn push(&mut self, delta: f64) {
        if self.limit == Some(0) {
            return;
        }
        if let Some(limit) = self.limit {
            while self.deltas.len() >= limit {
                self.deltas.pop_front();
            }
        }
        self.deltas.push_back(delta);
    }

    pub fn pop(&mut self) -> Option<f64> {
        self.deltas.pop_back()
    }

    pub fn last(&self) -> Option<f64> {
        self.deltas.back().copied()
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.deltas.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.deltas.iter().copied().collect()
    }
}
