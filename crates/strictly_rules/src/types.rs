//! Core domain types for the board.

use crate::error::MoveError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// Opaque identifier the transport assigns to a participant.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a transport-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Symbol a player places on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Mark {
    /// First symbol, handed to the first free seat.
    X,
    /// Second symbol.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here this round.
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// 3x3 board stored in row-major order (0-8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE],
        }
    }

    /// Gets the cell at the given index, if in range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Places a mark in an empty cell.
    #[instrument(skip(self))]
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        match self.cells.get_mut(index) {
            None => Err(MoveError::OutOfBounds(index)),
            Some(Cell::Occupied(_)) => Err(MoveError::Occupied(index)),
            Some(cell) => {
                *cell = Cell::Occupied(mark);
                Ok(())
            }
        }
    }

    /// Resets every cell to empty.
    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; BOARD_SIZE];
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// Indices of the cells still open for play.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Empty cells show their index so a reader can name a move.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                let symbol = match self.cells[index] {
                    Cell::Empty => index.to_string(),
                    Cell::Occupied(mark) => mark.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
