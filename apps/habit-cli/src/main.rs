//! # habit-cli
//!
//! Command-line front end for build-one-habit.
//!
//! - `habit goal new/show/add/undo/broaden/edit/delete/renew`: work on the
//!   active goal
//! - `habit history list/delete`: browse and prune finished goals
//! - `habit parse <text>`: preview how a target is read

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use habit_goal::{parse_target, HabitConfig};
use tracing_subscriber::EnvFilter;

/// build one habit: track a single goal until it sticks.
#[derive(Parser)]
#[command(name = "habit", version, about)]
struct Cli {
    /// Directory holding goal data (defaults to the platform data directory).
    #[arg(long, env = "HABIT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log lifecycle details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work on the active goal.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Browse and prune finished goals.
    History {
        #[command(subcommand)]
        command: commands::history::HistoryCommands,
    },
    /// Show the total and unit a goal target would get.
    Parse {
        /// Goal target, e.g. "read ten books".
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let config = HabitConfig::for_data_dir(&data_dir);
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");

    match &cli.command {
        Commands::Goal { command } => commands::goal::execute(command, &config),
        Commands::History { command } => commands::history::execute(command, &config),
        Commands::Parse { text } => {
            let parsed = parse_target(&text.join(" "));
            println!("Total: {}", parsed.total);
            if parsed.unit.is_empty() {
                println!("Unit:  (none)");
            } else {
                println!("Unit:  {}", parsed.unit);
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with command output.
    let level = if verbose { "debug" } else { "warn" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive(format!("habit_goal={level}").parse()?)
            .add_directive(format!("habit={level}").parse()?),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("build-one-habit"))
        .unwrap_or_else(|| PathBuf::from(".habit"))
}
