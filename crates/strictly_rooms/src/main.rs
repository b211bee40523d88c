//! Strictly Rooms - CLI
//!
//! Replays scripted sessions against the room core.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use strictly_rooms::{RoomRegistry, Script, Settings, TracingOutbound};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load(Some(cli.config.as_path()))?;

    match cli.command {
        Command::Replay { script } => run_replay(&settings, &script).await,
        Command::Config => print_config(&settings),
    }
}

fn initialize_tracing(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter())),
        )
        .init();
}

/// Run a script and report the final board
#[instrument(skip_all, fields(script = %script.display()))]
async fn run_replay(settings: &Settings, script: &std::path::Path) -> Result<()> {
    initialize_tracing(settings);

    let script = Script::from_file(script)?;
    let registry = RoomRegistry::new(settings.room().clone(), Arc::new(TracingOutbound));

    let state = script.run(&registry).await?;

    info!(
        winner = ?state.winner_name(),
        draws = *state.draw_count(),
        current_turn = ?state.current_turn(),
        "Replay finished"
    );
    println!("{}", state.board().display());
    for player in state.players().iter() {
        println!(
            "{} ({}): {} wins{}",
            player.display_name(),
            player.mark(),
            player.win_count(),
            if *player.connected() { "" } else { ", disconnected" }
        );
    }
    println!("draws: {}", state.draw_count());
    Ok(())
}

/// Print the effective settings
fn print_config(settings: &Settings) -> Result<()> {
    print!("{}", settings.to_toml()?);
    Ok(())
}
