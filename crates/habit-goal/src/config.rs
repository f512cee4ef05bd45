// config.rs: Data directory layout and user settings.
//
// HabitConfig determines where a session keeps its state. The
// `for_data_dir()` constructor lays everything out under one directory:
//
//   <data_dir>/
//     habit.toml       optional settings
//     events.jsonl     lifecycle activity log
//     store/           goal.json, increments.json, archive.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a goal session keeps its files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitConfig {
    /// Root of all habit data.
    pub data_dir: PathBuf,

    /// Directory for the three JSON records.
    pub store_dir: PathBuf,

    /// Path to the JSONL lifecycle event log.
    pub events_log: PathBuf,

    /// Path to the optional settings file.
    pub settings_file: PathBuf,

    #[serde(default)]
    pub settings: HabitSettings,
}

impl HabitConfig {
    /// Standard layout under `data_dir`, settings loaded from `habit.toml`
    /// if present.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let root = data_dir.as_ref().to_path_buf();
        let settings_file = root.join("habit.toml");
        let settings = HabitSettings::load_or_default(&settings_file);
        Self {
            store_dir: root.join("store"),
            events_log: root.join("events.jsonl"),
            settings_file,
            data_dir: root,
            settings,
        }
    }
}

/// Tunables read from `habit.toml`.
///
/// ```toml
/// # keep only the last 20 increments undoable
/// undo_limit = 20
/// # write events.jsonl
/// record_events = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSettings {
    /// Maximum number of increments kept for undo. Unset means unbounded.
    #[serde(default)]
    pub undo_limit: Option<usize>,

    /// Append lifecycle events to the event log.
    #[serde(default = "default_record_events")]
    pub record_events: bool,
}

impl Default for HabitSettings {
    fn default() -> Self {
        Self {
            undo_limit: None,
            record_events: default_record_events(),
        }
    }
}

fn default_record_events() -> bool {
    true
}

impl HabitSettings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Try to load settings, returning defaults if the file doesn't exist
    /// or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), "ignoring unreadable settings: {}", e);
                }
                Self::default()
            }
        }
    }
}
