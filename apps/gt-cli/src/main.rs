//! # gt-cli
//!
//! Command-line interface for Goal Tracker, usable without a game client:
//! - `goal-tracker goal add/list/rename/remove` — manage goals
//! - `goal-tracker task add-*/toggle/move/remove` — manage tasks
//! - `goal-tracker replay` — feed recorded host events through the tracker

mod commands;
mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use context::TrackerContext;

/// Goal Tracker — track goals and auto-complete their tasks.
#[derive(Parser)]
#[command(name = "goal-tracker", version, about)]
struct Cli {
    /// Data directory (defaults to the platform data dir).
    #[arg(long, env = "GOAL_TRACKER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Account profile whose goals to use.
    #[arg(long)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage goals.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Manage tasks inside goals.
    Task {
        #[command(subcommand)]
        command: commands::task::TaskCommands,
    },
    /// Replay recorded host events (JSONL) against a host snapshot.
    Replay {
        /// Host state snapshot (JSON).
        #[arg(long)]
        host: PathBuf,
        /// Event stream, one JSON event per line.
        #[arg(long)]
        events: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gt_tracker=info".parse()?)
                .add_directive("gt_goal=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let ctx = TrackerContext::resolve(cli.data_dir, cli.profile)?;

    match &cli.command {
        Commands::Goal { command } => commands::goal::execute(command, &ctx),
        Commands::Task { command } => commands::task::execute(command, &ctx),
        Commands::Replay { host, events } => commands::replay::execute(&ctx, host, events),
    }
}
