//! Strictly Rules - authoritative tic-tac-toe session state
//!
//! Pure data and rules for a two-player session: the board, the
//! join-ordered roster, the turn pointer, scores, outcome evaluation and
//! restart sequencing. No I/O and no timers; the restart pulse is exposed
//! as a flag plus an epoch so a host can schedule its clear.
//!
//! # Example
//!
//! ```
//! use strictly_rules::{GameSession, Outcome, Player, SessionId};
//!
//! let mut session = GameSession::new();
//! let alice = SessionId::from("alice");
//! let mark = session.available_mark();
//! session.add_player(Player::new(alice.clone(), "Alice".into(), mark)).unwrap();
//! session.assign_turn(alice.clone());
//!
//! session.apply_move(4, &alice).unwrap();
//! assert_eq!(session.evaluate_outcome(), Outcome::Undecided);
//! ```

#![warn(missing_docs)]

mod error;
mod player;
mod rules;
mod state;
mod types;

pub use error::{AdmissionError, MoveError};
pub use player::{MAX_PLAYERS, Player, Roster};
pub use rules::{LINES, Line, completed_lines, winning_line};
pub use state::{DRAW, GameSession, Outcome, Phase};
pub use types::{BOARD_SIZE, Board, Cell, Mark, SessionId};
