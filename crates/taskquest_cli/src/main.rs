//! `taskquest` command-line front end.
//!
//! # Responsibility
//! - Parse flags, resolve configuration and open the session store.
//! - Map each subcommand onto one session operation.

mod commands;
mod config;
mod console;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskquest_core::{Difficulty, PlayerClass};

#[derive(Parser)]
#[command(name = "taskquest", version, about = "Turn your to-do list into an RPG")]
struct Cli {
    /// SQLite database file [env: TASKQUEST_DB_PATH]
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files [env: TASKQUEST_LOG_DIR]
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error [env: TASKQUEST_LOG_LEVEL]
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the hero profile
    Onboard {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Paladin")]
        class: PlayerClass,
        /// Replace an existing profile, keeping all progress
        #[arg(long)]
        force: bool,
    },
    /// Show level, experience and quest counts
    Status,
    /// Add a quest
    Add {
        text: String,
        #[arg(long, short, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Complete a quest and collect its reward
    Complete { id: String },
    /// Remove a quest
    Delete { id: String },
    /// List quests
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the achievement catalog
    Achievements,
    /// Print the stored snapshot as JSON
    Export,
}

fn main() {
    let cli = Cli::parse();
    let config = config::CliConfig::resolve(cli.db, cli.log_dir, cli.log_level);

    if let Err(e) = commands::run(&config, cli.command) {
        log::error!(
            "event=cli_command module=cli status=error error_code={}",
            commands::error_code(e.as_ref())
        );
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
