//! Scripted room sessions for replays and demos.
//!
//! ```toml
//! room = "tic_tac_toe"
//!
//! [[step]]
//! action = "join"
//! session = "a"
//! name = "Alice"
//!
//! [[step]]
//! action = "move"
//! session = "a"
//! index = 4
//! ```

use crate::config::ConfigError;
use crate::error::RoomError;
use crate::message::{ClientMessage, JoinOptions, RoomId};
use crate::registry::RoomRegistry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_rules::{GameSession, SessionId};
use tracing::{debug, info, instrument, warn};

/// One transport event in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Participant joins with a display name.
    Join {
        /// Participant id.
        session: String,
        /// Display name.
        name: String,
    },
    /// Participant plays at an index.
    Move {
        /// Participant id.
        session: String,
        /// Board index.
        index: i64,
    },
    /// Participant asks for a new round.
    Restart {
        /// Participant id.
        session: String,
    },
    /// Participant's connection ends.
    Leave {
        /// Participant id.
        session: String,
        /// Whether the participant left on purpose.
        #[serde(default)]
        consented: bool,
    },
    /// Dropped participant reconnects.
    Rejoin {
        /// Participant id.
        session: String,
    },
    /// Let time pass, e.g. to run out a reconnection window.
    Wait {
        /// Milliseconds to wait.
        millis: u64,
    },
}

/// An ordered list of steps against one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Room name to create.
    #[serde(default = "default_room")]
    pub room: String,
    /// Steps in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_room() -> String {
    "tic_tac_toe".to_string()
}

impl Script {
    /// Loads a script from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read script: {}", e)))?;
        let script: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse script: {}", e)))?;
        info!(room = %script.room, steps = script.steps.len(), "Script loaded");
        Ok(script)
    }

    /// Runs every step against a new room and returns the final state.
    ///
    /// The room is closed afterwards.
    #[instrument(skip(self, registry), fields(room = %self.room))]
    pub async fn run(&self, registry: &RoomRegistry) -> Result<GameSession, RoomError> {
        let room_id = RoomId::new(self.room.clone());
        let room = registry.create_room(room_id.clone())?;

        for (number, step) in self.steps.iter().enumerate() {
            debug!(number, ?step, "Running step");
            match step {
                Step::Join { session, name } => {
                    room.join(SessionId::new(session.clone()), JoinOptions::new(name.clone()))?
                }
                Step::Move { session, index } => room.send(
                    SessionId::new(session.clone()),
                    ClientMessage::MakeMove { index: *index },
                )?,
                Step::Restart { session } => {
                    room.send(SessionId::new(session.clone()), ClientMessage::RestartGame)?
                }
                Step::Leave { session, consented } => {
                    room.leave(SessionId::new(session.clone()), *consented)?
                }
                Step::Rejoin { session } => {
                    if !room.rejoin(SessionId::new(session.clone())).await? {
                        warn!(session = %session, "Rejoin came too late");
                    }
                }
                Step::Wait { millis } => tokio::time::sleep(Duration::from_millis(*millis)).await,
            }
        }

        let state = room.snapshot().await?;
        registry.close_room(&room_id)?;
        Ok(state)
    }
}
