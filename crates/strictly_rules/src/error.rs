//! Rule violations reported by the game state.

use crate::types::SessionId;

/// Error returned when a move cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Index outside the 0-8 range.
    #[display("Index {} is off the board", _0)]
    OutOfBounds(usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(usize),

    /// The requester is not seated in this session.
    #[display("Player {} is not seated", _0)]
    UnknownPlayer(SessionId),
}

impl std::error::Error for MoveError {}

/// Error returned when a player cannot be seated.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum AdmissionError {
    /// Both seats are taken.
    #[display("Session already has 2 players")]
    RosterFull,

    /// A player with this id is already seated.
    #[display("Player {} is already seated", _0)]
    AlreadySeated(SessionId),
}

impl std::error::Error for AdmissionError {}
