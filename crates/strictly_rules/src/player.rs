//! Seated players and the join-ordered roster.

use crate::error::AdmissionError;
use crate::types::{Mark, SessionId};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Maximum number of players seated in one session.
pub const MAX_PLAYERS: usize = 2;

/// A participant seated in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Player {
    /// Transport-assigned identifier.
    session_id: SessionId,
    /// Name shown to the other participant.
    display_name: String,
    /// Mark this player places, fixed for the membership.
    mark: Mark,
    /// Rounds won since the last score reset.
    #[new(value = "0")]
    win_count: u32,
    /// Whether the transport currently holds a live connection.
    #[new(value = "true")]
    connected: bool,
}

impl Player {
    pub(crate) fn record_win(&mut self) {
        self.win_count += 1;
    }

    pub(crate) fn reset_wins(&mut self) {
        self.win_count = 0;
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

/// Players in join order.
///
/// Iteration order is join order and drives turn cycling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of seated players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// True when both seats are taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Seats a player at the end of the join order.
    pub fn insert(&mut self, player: Player) -> Result<(), AdmissionError> {
        if self.contains(player.session_id()) {
            return Err(AdmissionError::AlreadySeated(player.session_id().clone()));
        }
        if self.is_full() {
            return Err(AdmissionError::RosterFull);
        }
        self.players.push(player);
        Ok(())
    }

    /// Removes a player, keeping the order of the rest.
    pub fn remove(&mut self, id: &SessionId) -> Option<Player> {
        let index = self.position(id)?;
        Some(self.players.remove(index))
    }

    /// Looks up a player by id.
    pub fn get(&self, id: &SessionId) -> Option<&Player> {
        self.players.iter().find(|p| p.session_id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &SessionId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.session_id() == id)
    }

    /// True if a player with this id is seated.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }

    /// Finds the player holding `mark`.
    pub fn holder_of(&self, mark: Mark) -> Option<&Player> {
        self.players.iter().find(|p| *p.mark() == mark)
    }

    /// Join-order index of a player.
    pub fn position(&self, id: &SessionId) -> Option<usize> {
        self.players.iter().position(|p| p.session_id() == id)
    }

    /// Iterates players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    /// Players as a slice in join order.
    pub fn as_slice(&self) -> &[Player] {
        &self.players
    }

    /// Id of the player seated after `id`, wrapping around.
    ///
    /// An id that is not seated maps to the first player.
    pub fn next_after(&self, id: Option<&SessionId>) -> Option<&SessionId> {
        if self.players.is_empty() {
            return None;
        }
        let next = match id.and_then(|id| self.position(id)) {
            Some(index) => (index + 1) % self.players.len(),
            None => 0,
        };
        Some(self.players[next].session_id())
    }
}
