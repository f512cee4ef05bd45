// history.rs: History subcommands: list, delete.

use clap::Subcommand;
use habit_goal::{GoalSession, GoalStore, HabitConfig};

use super::goal::progress_line;
use super::{open_session, truncate};

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List finished goals, newest first.
    List,
    /// Delete a finished goal from history.
    Delete {
        /// Goal ID (as shown by `habit history list`).
        id: String,
    },
}

pub fn execute(cmd: &HistoryCommands, config: &HabitConfig) -> anyhow::Result<()> {
    let mut session = open_session(config)?;

    match cmd {
        HistoryCommands::List => list_history(&session),
        HistoryCommands::Delete { id } => delete_entry(&mut session, id)?,
    }

    session.close()?;
    Ok(())
}

fn list_history<S: GoalStore>(session: &GoalSession<S>) {
    let archive = session.archive();
    if archive.is_empty() {
        println!("No history yet.");
        return;
    }

    println!("{:<38} {:<30} {:<20}", "ID", "GOAL", "COMPLETED AT");
    println!("{}", "-".repeat(90));

    for goal in archive.newest_first() {
        let finished = goal
            .finished_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<30} {:<20}",
            goal.id,
            truncate(&goal.target, 28),
            finished
        );
        println!("{:<38} {}", "", progress_line(goal));
    }
    println!("\n{} finished goal(s).", archive.len());
}

fn delete_entry<S: GoalStore>(session: &mut GoalSession<S>, id: &str) -> anyhow::Result<()> {
    let id = uuid::Uuid::parse_str(id)?;
    if session.archive_delete(id)? {
        println!("Deleted history entry: {}", id);
    } else {
        println!("No history entry with ID {}.", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_goal::{GoalDraft, MemoryGoalStore};

    fn session_with_history() -> GoalSession<MemoryGoalStore> {
        let mut session = GoalSession::open(MemoryGoalStore::new()).unwrap();
        session
            .create(&GoalDraft::new("meditate", "daily", "sit", "quietly"))
            .unwrap();
        session.record_progress(1.0).unwrap();
        session.delete_goal().unwrap();
        session
    }

    #[test]
    fn delete_entry_removes_archived_goal() {
        let mut session = session_with_history();
        let id = session.archive().entries()[0].id;
        delete_entry(&mut session, &id.to_string()).unwrap();
        assert!(session.archive().is_empty());
    }

    #[test]
    fn delete_unknown_entry_is_not_an_error() {
        let mut session = session_with_history();
        delete_entry(&mut session, &uuid::Uuid::new_v4().to_string()).unwrap();
        assert_eq!(session.archive().len(), 1);
    }

    #[test]
    fn delete_entry_rejects_bad_id() {
        let mut session = session_with_history();
        assert!(delete_entry(&mut session, "not-a-uuid").is_err());
    }

    #[test]
    fn list_history_handles_empty_and_full() {
        let empty = GoalSession::open(MemoryGoalStore::new()).unwrap();
        list_history(&empty);
        list_history(&session_with_history());
    }
}
