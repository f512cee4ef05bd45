pub mod goal;
pub mod history;

use habit_goal::{FileGoalStore, GoalSession, HabitConfig, LogSink};

/// Open the on-disk session described by `config`, with the event log
/// attached unless disabled in `habit.toml`.
pub fn open_session(config: &HabitConfig) -> anyhow::Result<GoalSession<FileGoalStore>> {
    let store = FileGoalStore::new(&config.store_dir)?;
    let mut session = GoalSession::open_with_limit(store, config.settings.undo_limit)?;
    if config.settings.record_events {
        session.add_sink(Box::new(LogSink::new(&config.events_log)));
    }
    Ok(session)
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("read 10 books every night", 10), "read 10...");
        assert_eq!(truncate("养成一个习惯养成一个习惯", 6), "养成一...");
    }

    #[test]
    fn open_session_creates_store_dir() {
        let dir = TempDir::new().unwrap();
        let config = HabitConfig::for_data_dir(dir.path());
        let session = open_session(&config).unwrap();
        assert!(config.store_dir.exists());
        assert!(session.goal().is_none());
    }
}
