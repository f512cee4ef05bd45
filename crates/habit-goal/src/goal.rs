// goal.rs: HabitGoal: the single commitment being tracked.
//
// A goal reads as one sentence:
//   "I will <target> before <deadline>. For this purpose, I will
//    <action> <action_detail>."
// plus free-text specifics. The target's trailing quantity becomes the
// numeric total that progress is measured against.
//
// Lifecycle:
//   Empty → Active (progress < total) → Completed (progress ≥ total)
//   Completed → Active via broaden, edit or undo
//   Active/Completed → Empty via delete or set-new-goal

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;
use crate::target::parse_target;

/// Lifecycle state of the active goal slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    /// No goal is being tracked.
    Empty,
    /// Progress is below the total.
    Active,
    /// Progress has reached the total.
    Completed,
}

impl fmt::Display for GoalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalState::Empty => write!(f, "empty"),
            GoalState::Active => write!(f, "active"),
            GoalState::Completed => write!(f, "completed"),
        }
    }
}

impl GoalState {
    /// State of a goal slot that may or may not hold a goal.
    pub fn of(goal: Option<&HabitGoal>) -> Self {
        match goal {
            None => GoalState::Empty,
            Some(g) if g.is_complete() => GoalState::Completed,
            Some(_) => GoalState::Active,
        }
    }
}

/// Round to two decimal places.
///
/// Applied after every progress add/subtract so that many small increments
/// (0.1 + 0.2 + ...) do not accumulate floating point drift.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A habit goal, either live or archived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitGoal {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,

    /// Desired outcome, e.g. "read 10 books".
    pub target: String,

    /// Free-text deadline, e.g. "end of March".
    pub deadline: String,

    /// Committed action, e.g. "read".
    pub action: String,

    /// How the action is carried out, e.g. "for 30 minutes after dinner".
    pub action_detail: String,

    /// Further specifics ("I will start reading at 9 a.m.").
    #[serde(default)]
    pub specific: String,

    /// Quantity accumulated so far.
    pub progress: f64,

    /// Quantity required to complete the goal. Always positive.
    pub total: f64,

    /// Unit label for progress and total; may be empty.
    #[serde(default)]
    pub unit: String,

    /// When the goal was created.
    pub created_at: DateTime<Utc>,

    /// When the goal was archived. Only set on archive snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl HabitGoal {
    /// Build a fresh goal from a validated draft. Total and unit come from
    /// the target text.
    pub fn from_draft(draft: &GoalDraft) -> Result<Self, GoalError> {
        draft.validate()?;
        let parsed = parse_target(&draft.target);
        Ok(Self {
            id: Uuid::new_v4(),
            target: draft.target.clone(),
            deadline: draft.deadline.clone(),
            action: draft.action.clone(),
            action_detail: draft.action_detail.clone(),
            specific: draft.specific.clone(),
            progress: 0.0,
            total: parsed.total,
            unit: parsed.unit,
            created_at: Utc::now(),
            finished_at: None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.total
    }

    pub fn state(&self) -> GoalState {
        GoalState::of(Some(self))
    }

    /// Amount still needed to reach the total.
    pub fn remaining(&self) -> f64 {
        (self.total - self.progress).max(0.0)
    }

    /// Completion ratio in `[0, 1]`, for progress bars.
    pub fn fraction(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.progress / self.total).clamp(0.0, 1.0)
    }

    /// Copy of this goal stamped as finished now.
    pub fn finished_snapshot(&self) -> HabitGoal {
        HabitGoal {
            finished_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Apply an edit in place. Progress, id, created_at are untouched.
    pub(crate) fn apply_edit(&mut self, edit: &GoalEdit) {
        self.target = edit.target.clone();
        self.deadline = edit.deadline.clone();
        self.action = edit.action.clone();
        self.action_detail = edit.action_detail.clone();
        self.specific = edit.specific.clone();
        self.total = edit.total;
        self.unit = edit.unit.clone();
    }
}

/// User input for creating a goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalDraft {
    pub target: String,
    pub deadline: String,
    pub action: String,
    pub action_detail: String,
    #[serde(default)]
    pub specific: String,
}

impl GoalDraft {
    pub fn new(
        target: impl Into<String>,
        deadline: impl Into<String>,
        action: impl Into<String>,
        action_detail: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            deadline: deadline.into(),
            action: action.into(),
            action_detail: action_detail.into(),
            specific: String::new(),
        }
    }

    pub fn with_specific(mut self, specific: impl Into<String>) -> Self {
        self.specific = specific.into();
        self
    }

    /// Target, deadline, action and action detail are required.
    pub fn validate(&self) -> Result<(), GoalError> {
        require_fields(&[
            ("target", &self.target),
            ("deadline", &self.deadline),
            ("action", &self.action),
            ("action detail", &self.action_detail),
        ])
    }
}

/// User input for editing an existing goal. Every field is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalEdit {
    pub target: String,
    pub deadline: String,
    pub action: String,
    pub action_detail: String,
    pub specific: String,
    pub total: f64,
    pub unit: String,
}

impl GoalEdit {
    /// Pre-fill an edit with the goal's current values.
    pub fn from_goal(goal: &HabitGoal) -> Self {
        Self {
            target: goal.target.clone(),
            deadline: goal.deadline.clone(),
            action: goal.action.clone(),
            action_detail: goal.action_detail.clone(),
            specific: goal.specific.clone(),
            total: goal.total,
            unit: goal.unit.clone(),
        }
    }

    /// Same text requirements as a draft, and the new total may not drop
    /// below what has already been achieved.
    pub fn validate(&self, progress: f64) -> Result<(), GoalError> {
        require_fields(&[
            ("target", &self.target),
            ("deadline", &self.deadline),
            ("action", &self.action),
            ("action detail", &self.action_detail),
        ])?;
        if !self.total.is_finite() || self.total <= 0.0 {
            return Err(GoalError::Validation(format!(
                "total must be a positive number, got {}",
                self.total
            )));
        }
        if self.total < progress {
            return Err(GoalError::Validation(format!(
                "total cannot be less than current progress ({})",
                progress
            )));
        }
        Ok(())
    }
}

fn require_fields(fields: &[(&str, &String)]) -> Result<(), GoalError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GoalError::Validation(format!(
            "please fill in all goal information (missing: {})",
            missing.join(", ")
        )))
    }
}
