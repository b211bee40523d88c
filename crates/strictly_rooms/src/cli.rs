//! Command-line interface for strictly_rooms.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Rooms - authoritative two-player tic-tac-toe rooms
#[derive(Parser, Debug)]
#[command(name = "strictly_rooms")]
#[command(about = "Authoritative two-player tic-tac-toe rooms", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, default_value = "strictly_rooms.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a scripted session against a fresh room
    Replay {
        /// Path to the TOML script
        script: PathBuf,
    },

    /// Print the effective settings as TOML
    Config,
}
