//! Line detection for tic-tac-toe.
//!
//! Pure functions over a [`Board`]; the session decides what a finished
//! line means for scores.

use crate::types::{Board, Cell, Mark};
use tracing::instrument;

/// A winning line as three board indices.
pub type Line = [usize; 3];

/// The eight canonical lines in scan order.
pub const LINES: [Line; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Lines fully occupied by a single mark, in canonical order.
#[instrument(skip(board))]
pub fn completed_lines(board: &Board) -> Vec<(Mark, Line)> {
    LINES
        .iter()
        .filter_map(|&[a, b, c]| match board.get(a) {
            Some(Cell::Occupied(mark))
                if board.get(b) == Some(Cell::Occupied(mark))
                    && board.get(c) == Some(Cell::Occupied(mark)) =>
            {
                Some((mark, [a, b, c]))
            }
            _ => None,
        })
        .collect()
}

/// First completed line in canonical order, if any.
pub fn winning_line(board: &Board) -> Option<(Mark, Line)> {
    completed_lines(board).into_iter().next()
}
