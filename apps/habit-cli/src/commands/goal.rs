// goal.rs: Goal subcommands: new, show, add, undo, broaden, edit, delete, renew.

use clap::{Args, Subcommand};
use habit_goal::{
    GoalDraft, GoalEdit, GoalError, GoalSession, GoalState, GoalStore, HabitConfig, HabitGoal,
};

use super::open_session;

const BAR_WIDTH: usize = 20;

/// The goal sentence: "I will <target> before <deadline>. For this
/// purpose, I will <action> <detail>."
#[derive(Args, Debug, Clone)]
pub struct DraftArgs {
    /// What you will achieve (e.g., "read 10 books").
    #[arg(long)]
    pub target: String,
    /// When you will achieve it by.
    #[arg(long)]
    pub deadline: String,
    /// What you will do for it (e.g., "read").
    #[arg(long)]
    pub action: String,
    /// How you will do it (e.g., "every night before bed").
    #[arg(long)]
    pub detail: String,
    /// Be more specific (e.g., "I will start at 9 p.m. and read for one hour").
    #[arg(long, default_value = "")]
    pub specific: String,
}

impl DraftArgs {
    fn to_draft(&self) -> GoalDraft {
        GoalDraft::new(&*self.target, &*self.deadline, &*self.action, &*self.detail)
            .with_specific(&*self.specific)
    }
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Set a new goal (only when no goal is active).
    New(DraftArgs),
    /// Show the active goal and its progress.
    Show,
    /// Record progress toward the goal.
    Add {
        /// Amount done (e.g., 1 or 0.5).
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Undo the last recorded progress.
    Undo,
    /// Raise the total of a completed goal and keep going.
    Broaden {
        /// New total, greater than the current one.
        total: f64,
        /// New details (defaults to the current ones).
        #[arg(long)]
        specific: Option<String>,
    },
    /// Edit the active goal. Omitted fields keep their current values.
    Edit {
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long)]
        specific: Option<String>,
        /// New total; may not be below current progress.
        #[arg(long)]
        total: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Delete the active goal. Completed goals are kept in history.
    Delete,
    /// Replace the active goal with a new one, archiving it if completed.
    Renew(DraftArgs),
}

pub fn execute(cmd: &GoalCommands, config: &HabitConfig) -> anyhow::Result<()> {
    let mut session = open_session(config)?;

    match cmd {
        GoalCommands::New(args) => new_goal(&mut session, &args.to_draft())?,
        GoalCommands::Show => show_goal(&session),
        GoalCommands::Add { amount } => add_progress(&mut session, *amount)?,
        GoalCommands::Undo => undo_progress(&mut session)?,
        GoalCommands::Broaden { total, specific } => {
            broaden_goal(&mut session, *total, specific.as_deref())?
        }
        GoalCommands::Edit {
            target,
            deadline,
            action,
            detail,
            specific,
            total,
            unit,
        } => {
            let current = session
                .goal()
                .ok_or_else(|| anyhow::anyhow!("No goal set. Run `habit goal new` first."))?;
            let mut edit = GoalEdit::from_goal(current);
            overwrite(&mut edit.target, target);
            overwrite(&mut edit.deadline, deadline);
            overwrite(&mut edit.action, action);
            overwrite(&mut edit.action_detail, detail);
            overwrite(&mut edit.specific, specific);
            overwrite(&mut edit.unit, unit);
            if let Some(total) = total {
                edit.total = *total;
            }
            edit_goal(&mut session, &edit)?
        }
        GoalCommands::Delete => delete_goal(&mut session)?,
        GoalCommands::Renew(args) => renew_goal(&mut session, &args.to_draft())?,
    }

    session.close()?;
    Ok(())
}

fn overwrite(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

fn new_goal<S: GoalStore>(session: &mut GoalSession<S>, draft: &GoalDraft) -> anyhow::Result<()> {
    let goal = session.create(draft)?;
    println!("Goal set: {}", goal.id);
    print_goal(goal);
    Ok(())
}

fn show_goal<S: GoalStore>(session: &GoalSession<S>) {
    match session.goal() {
        Some(goal) => {
            print_goal(goal);
            if session.can_undo() {
                println!(
                    "Undo:     available ({} step(s))",
                    session.increments().len()
                );
            }
        }
        None => {
            println!("No goal set. Run `habit goal new` to set one.");
        }
    }
}

fn add_progress<S: GoalStore>(session: &mut GoalSession<S>, amount: f64) -> anyhow::Result<()> {
    let delta = session.record_progress(amount)?;
    if delta < amount {
        println!("Only {} remained; recorded that instead of {}.", delta, amount);
    }
    if let Some(goal) = session.goal() {
        println!("Progress: {}", progress_line(goal));
        if session.state() == GoalState::Completed {
            println!("Goal completed!");
            println!("  Set a new goal:     habit goal renew --target ...");
            println!("  Broaden this goal:  habit goal broaden <new-total>");
        }
    }
    Ok(())
}

fn undo_progress<S: GoalStore>(session: &mut GoalSession<S>) -> anyhow::Result<()> {
    match session.undo() {
        Ok(delta) => {
            println!("Undid {}.", delta);
            if let Some(goal) = session.goal() {
                println!("Progress: {}", progress_line(goal));
            }
            Ok(())
        }
        Err(GoalError::NoHistory) => {
            println!("Nothing to undo.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn broaden_goal<S: GoalStore>(
    session: &mut GoalSession<S>,
    total: f64,
    specific: Option<&str>,
) -> anyhow::Result<()> {
    let specific = match specific {
        Some(s) => s.to_string(),
        None => session
            .goal()
            .map(|g| g.specific.clone())
            .unwrap_or_default(),
    };
    let goal = session.broaden(total, specific)?;
    println!("Goal broadened to {}.", total_line(goal));
    println!("Progress: {}", progress_line(goal));
    Ok(())
}

fn edit_goal<S: GoalStore>(session: &mut GoalSession<S>, edit: &GoalEdit) -> anyhow::Result<()> {
    let goal = session.edit(edit)?;
    println!("Goal updated.");
    print_goal(goal);
    Ok(())
}

fn delete_goal<S: GoalStore>(session: &mut GoalSession<S>) -> anyhow::Result<()> {
    match session.delete_goal()? {
        Some(archived) => println!("Goal completed and moved to history: {}", archived.target),
        None => println!("Goal deleted."),
    }
    Ok(())
}

fn renew_goal<S: GoalStore>(session: &mut GoalSession<S>, draft: &GoalDraft) -> anyhow::Result<()> {
    if let Some(archived) = session.replace(draft)? {
        println!("Previous goal moved to history: {}", archived.target);
    }
    if let Some(goal) = session.goal() {
        println!("Goal set: {}", goal.id);
        print_goal(goal);
    }
    Ok(())
}

fn print_goal(goal: &HabitGoal) {
    println!("Goal:     I will {} before {}.", goal.target, goal.deadline);
    println!("Action:   {} {}", goal.action, goal.action_detail);
    if !goal.specific.is_empty() {
        println!("Details:  {}", goal.specific);
    }
    println!("Progress: {}", progress_line(goal));
    println!("State:    {}", goal.state());
    println!("Created:  {}", goal.created_at.to_rfc3339());
}

fn total_line(goal: &HabitGoal) -> String {
    if goal.unit.is_empty() {
        goal.total.to_string()
    } else {
        format!("{} {}", goal.total, goal.unit)
    }
}

/// `[########------------] 4/10 books (40%)`
pub fn progress_line(goal: &HabitGoal) -> String {
    let fraction = goal.fraction();
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {}/{} ({:.0}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        goal.progress,
        total_line(goal),
        fraction * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_goal::{FileGoalStore, MemoryGoalStore};
    use tempfile::TempDir;

    fn draft() -> GoalDraft {
        GoalDraft::new("read 10 books", "june", "read", "every night")
    }

    #[test]
    fn progress_line_renders_bar() {
        let mut goal = HabitGoal::from_draft(&draft()).unwrap();
        goal.progress = 4.0;
        assert_eq!(
            progress_line(&goal),
            "[########------------] 4/10 books (40%)"
        );
    }

    #[test]
    fn add_and_undo_through_commands() {
        let mut session = GoalSession::open(MemoryGoalStore::new()).unwrap();
        new_goal(&mut session, &draft()).unwrap();
        add_progress(&mut session, 12.0).unwrap();
        assert_eq!(session.state(), GoalState::Completed);
        undo_progress(&mut session).unwrap();
        assert_eq!(session.goal().unwrap().progress, 0.0);
        // A second undo has nothing left and is not an error.
        undo_progress(&mut session).unwrap();
    }

    #[test]
    fn broaden_keeps_details_when_omitted() {
        let mut session = GoalSession::open(MemoryGoalStore::new()).unwrap();
        let d = draft().with_specific("an hour a night");
        new_goal(&mut session, &d).unwrap();
        add_progress(&mut session, 10.0).unwrap();
        broaden_goal(&mut session, 15.0, None).unwrap();
        let goal = session.goal().unwrap();
        assert_eq!(goal.total, 15.0);
        assert_eq!(goal.specific, "an hour a night");
    }

    #[test]
    fn new_goal_conflicts_with_active_goal() {
        let mut session = GoalSession::open(MemoryGoalStore::new()).unwrap();
        new_goal(&mut session, &draft()).unwrap();
        let err = new_goal(&mut session, &draft()).unwrap_err();
        assert!(err.to_string().contains("still active"));
    }

    #[test]
    fn execute_persists_between_invocations() {
        let dir = TempDir::new().unwrap();
        let config = HabitConfig::for_data_dir(dir.path());
        let args = DraftArgs {
            target: "run 3 km".into(),
            deadline: "sunday".into(),
            action: "run".into(),
            detail: "before work".into(),
            specific: String::new(),
        };

        execute(&GoalCommands::New(args.clone()), &config).unwrap();
        execute(&GoalCommands::Add { amount: 3.0 }, &config).unwrap();
        execute(&GoalCommands::Renew(args), &config).unwrap();

        let store = FileGoalStore::new(&config.store_dir).unwrap();
        let session = GoalSession::open(store).unwrap();
        assert_eq!(session.archive().len(), 1);
        assert_eq!(session.goal().unwrap().progress, 0.0);
        assert!(config.events_log.exists());
    }

    #[test]
    fn edit_without_goal_fails() {
        let dir = TempDir::new().unwrap();
        let config = HabitConfig::for_data_dir(dir.path());
        let cmd = GoalCommands::Edit {
            target: None,
            deadline: None,
            action: None,
            detail: None,
            specific: None,
            total: Some(5.0),
            unit: None,
        };
        assert!(execute(&cmd, &config).is_err());
    }
}
