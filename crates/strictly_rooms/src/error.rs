//! Request rejections and room host errors.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A recoverable request rejection, reported only to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RequestError {
    /// The round has concluded.
    #[display("Game is already over.")]
    GameOver,

    /// Someone else holds the turn.
    #[display("It's not your turn.")]
    NotYourTurn,

    /// Cell occupied or index off the board.
    #[display("Invalid move. Try another position.")]
    InvalidMove,

    /// Restart asked for before the round concluded.
    #[display("The game is not completed yet.")]
    RoundInProgress,

    /// The requester holds no seat in this room.
    #[display("You are not seated in this game.")]
    NotSeated,

    /// Payload did not decode for the named message type.
    #[display("Malformed \"{}\" message.", _0)]
    Malformed(String),
}

impl std::error::Error for RequestError {}

impl RequestError {
    /// Notice payload sent back to the requester.
    pub fn notice(&self) -> ErrorNotice {
        ErrorNotice {
            message: self.to_string(),
        }
    }
}

/// Body of the `"error"` message sent to a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// Human-readable reason.
    pub message: String,
}

/// What went wrong talking to a room.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RoomErrorKind {
    /// The room task has stopped.
    #[display("Room {} is closed", _0)]
    Closed(String),

    /// A room with this id is already hosted.
    #[display("Room {} already exists", _0)]
    AlreadyExists(String),

    /// No room with this id is hosted.
    #[display("Room {} not found", _0)]
    NotFound(String),

    /// The registry lock was poisoned by a panicking thread.
    #[display("Room registry lock poisoned")]
    Poisoned,
}

/// Room host error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Room error: {} at {}:{}", kind, file, line)]
pub struct RoomError {
    /// Error details.
    pub kind: RoomErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RoomError {
    /// Creates a new room error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: RoomErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
