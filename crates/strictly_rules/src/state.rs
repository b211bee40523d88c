//! Session state: board, roster, turn pointer and scores.

use crate::error::{AdmissionError, MoveError};
use crate::player::{Player, Roster};
use crate::rules::{Line, completed_lines};
use crate::types::{Board, Mark, SessionId};
use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Winner name recorded when a round ends in a draw.
pub const DRAW: &str = "Draw";

/// Result of evaluating the board after a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A line was completed by a seated player.
    Won {
        /// Player who completed the line.
        winner: SessionId,
        /// The completed line.
        line: Line,
    },
    /// Board is full without a completed line.
    Draw,
    /// Round continues.
    Undecided,
    /// Round had already concluded; nothing was evaluated.
    AlreadyOver,
}

/// Coarse lifecycle view of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fewer than two players seated and no concluded round.
    AwaitingPlayers,
    /// Round in play.
    InProgress,
    /// Round concluded with a winner.
    Won,
    /// Round concluded in a draw.
    Draw,
}

/// Authoritative state of one two-player session.
///
/// This is the replicated snapshot: the controller broadcasts it after
/// every mutation. It never talks to the transport itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameSession {
    /// The board.
    board: Board,
    /// Seated players in join order.
    players: Roster,
    /// Player allowed to move next.
    #[getter(skip)]
    current_turn: Option<SessionId>,
    /// True once the round is won or drawn.
    game_over: bool,
    /// Winner's display name, or [`DRAW`].
    #[getter(skip)]
    winner_name: Option<String>,
    /// Winner's id; stays `None` on a draw.
    #[getter(skip)]
    winner_id: Option<SessionId>,
    /// Draws since the last score reset.
    draw_count: u32,
    /// Raised by a restart and cleared shortly after.
    restart_pulse: bool,
    #[serde(skip)]
    #[getter(skip)]
    restart_epoch: u64,
}

impl GameSession {
    /// Creates an empty session awaiting players.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Player allowed to move next.
    pub fn current_turn(&self) -> Option<&SessionId> {
        self.current_turn.as_ref()
    }

    /// Winner's display name, or [`DRAW`].
    pub fn winner_name(&self) -> Option<&str> {
        self.winner_name.as_deref()
    }

    /// Winner of the last concluded round, if it was not a draw.
    pub fn winner_id(&self) -> Option<&SessionId> {
        self.winner_id.as_ref()
    }

    /// Looks up a seated player.
    pub fn player(&self, id: &SessionId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Mark the next admitted player receives.
    pub fn available_mark(&self) -> Mark {
        if self.players.holder_of(Mark::X).is_some() {
            Mark::O
        } else {
            Mark::X
        }
    }

    /// Derived lifecycle phase.
    pub fn phase(&self) -> Phase {
        match (self.game_over, self.winner_id.is_some()) {
            (true, true) => Phase::Won,
            (true, false) => Phase::Draw,
            (false, _) if self.players.len() < 2 => Phase::AwaitingPlayers,
            (false, _) => Phase::InProgress,
        }
    }

    /// Seats a player at the end of the join order.
    #[instrument(skip(self, player), fields(session_id = %player.session_id()))]
    pub fn add_player(&mut self, player: Player) -> Result<(), AdmissionError> {
        self.players.insert(player)
    }

    /// Removes a player; the turn pointer is left for a restart to fix.
    #[instrument(skip(self))]
    pub fn remove_player(&mut self, id: &SessionId) -> Option<Player> {
        self.players.remove(id)
    }

    /// Flags a player as connected or not. Returns false if not seated.
    #[instrument(skip(self))]
    pub fn set_connected(&mut self, id: &SessionId, connected: bool) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.set_connected(connected);
                true
            }
            None => false,
        }
    }

    /// Zeroes every win count and the draw count.
    #[instrument(skip(self))]
    pub fn reset_scores(&mut self) {
        self.draw_count = 0;
        self.players.iter_mut().for_each(Player::reset_wins);
    }

    /// Hands the turn to `id`.
    pub fn assign_turn(&mut self, id: SessionId) {
        self.current_turn = Some(id);
    }

    /// True when the recorded turn holder is gone or disconnected.
    pub fn turn_holder_absent(&self) -> bool {
        match &self.current_turn {
            Some(id) => self.players.get(id).is_none_or(|p| !*p.connected()),
            None => false,
        }
    }

    /// Checks the index is on the board and the cell is empty.
    pub fn is_valid_move(&self, index: usize) -> bool {
        self.board.is_empty(index)
    }

    /// Writes the requester's mark into `index`.
    ///
    /// Turn order and outcome are left to the caller so it can sequence
    /// move, evaluation and turn advance.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, index: usize, id: &SessionId) -> Result<(), MoveError> {
        let mark = *self
            .players
            .get(id)
            .ok_or_else(|| MoveError::UnknownPlayer(id.clone()))?
            .mark();
        self.board.place(index, mark)?;
        debug!(index, %mark, "Mark placed");
        Ok(())
    }

    /// Scans the board for a completed line or a draw.
    ///
    /// Lines are scanned in canonical order; the first one whose mark has
    /// a seated owner wins.
    #[instrument(skip(self))]
    pub fn evaluate_outcome(&mut self) -> Outcome {
        if self.game_over {
            debug!("Round already concluded");
            return Outcome::AlreadyOver;
        }

        for (mark, line) in completed_lines(&self.board) {
            let Some(owner) = self.players.iter().find(|p| *p.mark() == mark) else {
                continue;
            };
            let winner = owner.session_id().clone();
            let name = owner.display_name().clone();
            if let Some(owner) = self.players.get_mut(&winner) {
                owner.record_win();
            }
            info!(winner = %winner, name = %name, ?line, "Round won");
            self.winner_name = Some(name);
            self.winner_id = Some(winner.clone());
            self.game_over = true;
            return Outcome::Won { winner, line };
        }

        if self.board.is_full() {
            info!(draws = self.draw_count + 1, "Round drawn");
            self.game_over = true;
            self.winner_name = Some(DRAW.to_string());
            self.draw_count += 1;
            return Outcome::Draw;
        }

        Outcome::Undecided
    }

    /// Passes the turn to the next player in join order.
    ///
    /// Does nothing with fewer than two players.
    #[instrument(skip(self))]
    pub fn advance_turn(&mut self) {
        if self.players.len() < 2 {
            debug!("Not enough players to pass the turn");
            return;
        }
        self.current_turn = self.players.next_after(self.current_turn.as_ref()).cloned();
        debug!(current_turn = ?self.current_turn, "Turn advanced");
    }

    /// Starts a new round using the thread-local RNG for a tie-break.
    pub fn restart(&mut self) -> u64 {
        self.restart_with(&mut rand::thread_rng())
    }

    /// Starts a new round and returns its restart epoch.
    ///
    /// The loser of the previous round opens. Without a recorded winner, or
    /// when nobody but the winner remains, the opener is drawn uniformly
    /// from the seated players.
    #[instrument(skip(self, rng))]
    pub fn restart_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u64 {
        self.board.clear();
        self.winner_name = None;
        self.game_over = false;

        let loser = self.winner_id.as_ref().and_then(|winner| {
            self.players
                .iter()
                .find(|p| p.session_id() != winner)
                .map(|p| p.session_id().clone())
        });
        self.current_turn = match loser {
            Some(id) => Some(id),
            None => self
                .players
                .as_slice()
                .choose(rng)
                .map(|p| p.session_id().clone()),
        };

        self.winner_id = None;
        self.restart_pulse = true;
        self.restart_epoch += 1;
        info!(
            current_turn = ?self.current_turn,
            epoch = self.restart_epoch,
            "Game restarted"
        );
        self.restart_epoch
    }

    /// Epoch of the most recent restart.
    pub fn restart_epoch(&self) -> u64 {
        self.restart_epoch
    }

    /// Lowers the restart pulse if `epoch` is still the latest restart.
    ///
    /// Returns true if the flag changed.
    #[instrument(skip(self))]
    pub fn clear_restart_pulse(&mut self, epoch: u64) -> bool {
        if epoch != self.restart_epoch || !self.restart_pulse {
            debug!(latest = self.restart_epoch, "Ignoring stale pulse clear");
            return false;
        }
        self.restart_pulse = false;
        true
    }
}
