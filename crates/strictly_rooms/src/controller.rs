//! Admission, message arbitration and departure handling for one room.

use crate::config::RoomConfig;
use crate::error::RequestError;
use crate::message::{ClientMessage, JoinOptions, RoomId};
use crate::outbound::Outbound;
use crate::room::RoomCommand;
use crate::timers::{PulseTimer, ReconnectionWindow};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strictly_rules::{GameSession, Player, SessionId};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Owns one session and turns transport events into state changes.
///
/// Only the room task calls into the controller, one command at a time.
/// Every successful mutation ends with a broadcast of the full snapshot.
pub(crate) struct SessionController {
    room: RoomId,
    state: GameSession,
    config: RoomConfig,
    outbound: Arc<dyn Outbound>,
    commands: mpsc::WeakUnboundedSender<RoomCommand>,
    windows: HashMap<SessionId, ReconnectionWindow>,
    next_generation: u64,
    pulse: Option<PulseTimer>,
}

impl SessionController {
    pub(crate) fn new(
        room: RoomId,
        config: RoomConfig,
        outbound: Arc<dyn Outbound>,
        commands: mpsc::WeakUnboundedSender<RoomCommand>,
    ) -> Self {
        Self {
            room,
            state: GameSession::new(),
            config,
            outbound,
            commands,
            windows: HashMap::new(),
            next_generation: 0,
            pulse: None,
        }
    }

    pub(crate) fn state(&self) -> &GameSession {
        &self.state
    }

    fn broadcast(&self) {
        self.outbound.broadcast(&self.room, &self.state);
    }

    /// Seats a newcomer, or disconnects them when both seats are taken.
    #[instrument(skip(self, options), fields(name = %options.display_name))]
    pub(crate) fn on_join(&mut self, session_id: SessionId, options: JoinOptions) {
        if self.state.players().contains(&session_id) {
            warn!(%session_id, "Duplicate join ignored");
            return;
        }
        if self.state.players().is_full() {
            warn!(%session_id, "Room full, disconnecting newcomer");
            self.outbound.disconnect(&self.room, &session_id);
            return;
        }

        let mark = self.state.available_mark();
        let player = Player::new(session_id.clone(), options.display_name, mark);
        if let Err(e) = self.state.add_player(player) {
            warn!(%session_id, error = %e, "Admission refused");
            self.outbound.disconnect(&self.room, &session_id);
            return;
        }
        if self.state.players().len() == 1 {
            self.state.assign_turn(session_id.clone());
        }

        info!(%session_id, %mark, "Player joined");
        self.broadcast();
    }

    /// Decodes a wire message and arbitrates it.
    #[instrument(skip(self, payload))]
    pub(crate) fn on_raw_message(&mut self, session_id: &SessionId, kind: &str, payload: Value) {
        match ClientMessage::decode(kind, payload) {
            Ok(message) => self.on_message(session_id, message),
            Err(e) => self.reject(session_id, &e),
        }
    }

    /// Arbitrates a game message; failures go back to the requester only.
    #[instrument(skip(self))]
    pub(crate) fn on_message(&mut self, session_id: &SessionId, message: ClientMessage) {
        let turn_before = self.state.current_turn().cloned();
        let result = match message {
            ClientMessage::MakeMove { index } => self.make_move(session_id, index),
            ClientMessage::RestartGame => self.restart_game(session_id),
        };

        match result {
            Ok(()) => self.broadcast(),
            Err(e) => {
                // A liveness reassignment sticks even if the move itself failed.
                if self.state.current_turn() != turn_before.as_ref() {
                    self.broadcast();
                }
                self.reject(session_id, &e);
            }
        }
    }

    fn reject(&self, session_id: &SessionId, error: &RequestError) {
        warn!(%session_id, error = %error, "Request rejected");
        self.outbound.notify(&self.room, session_id, &error.notice());
    }

    fn make_move(&mut self, session_id: &SessionId, index: i64) -> Result<(), RequestError> {
        if *self.state.game_over() {
            return Err(RequestError::GameOver);
        }
        let requester_connected = match self.state.player(session_id) {
            Some(player) => *player.connected(),
            None => return Err(RequestError::NotSeated),
        };

        if requester_connected
            && self.state.current_turn() != Some(session_id)
            && self.state.turn_holder_absent()
        {
            info!(
                previous = ?self.state.current_turn(),
                %session_id,
                "Turn holder absent, reassigning turn"
            );
            self.state.assign_turn(session_id.clone());
        }

        if self.state.current_turn() != Some(session_id) {
            return Err(RequestError::NotYourTurn);
        }

        let index = usize::try_from(index).map_err(|_| RequestError::InvalidMove)?;
        if !self.state.is_valid_move(index) {
            debug!(index, "Cell taken or off the board");
            return Err(RequestError::InvalidMove);
        }
        self.state.apply_move(index, session_id).map_err(|e| {
            debug!(error = %e, "Move refused by rules");
            RequestError::InvalidMove
        })?;

        let outcome = self.state.evaluate_outcome();
        if !*self.state.game_over() {
            self.state.advance_turn();
        }
        info!(
            %session_id,
            index,
            ?outcome,
            next = ?self.state.current_turn(),
            "Move applied"
        );
        Ok(())
    }

    fn restart_game(&mut self, session_id: &SessionId) -> Result<(), RequestError> {
        if !self.state.players().contains(session_id) {
            return Err(RequestError::NotSeated);
        }
        if self.state.winner_name().is_none() {
            return Err(RequestError::RoundInProgress);
        }
        self.restart();
        Ok(())
    }

    /// Starts a new round and schedules the pulse clear.
    ///
    /// Replacing the pending timer drops it, which cancels its clear.
    fn restart(&mut self) {
        let epoch = self.state.restart();
        self.pulse = self
            .commands
            .upgrade()
            .map(|commands| PulseTimer::schedule(epoch, self.config.restart_pulse(), commands));
    }

    /// Handles a connection ending, voluntary or not.
    #[instrument(skip(self))]
    pub(crate) fn on_leave(&mut self, session_id: &SessionId, consented: bool) {
        if self.windows.contains_key(session_id) {
            if !consented {
                debug!(%session_id, "Already awaiting reconnection");
                return;
            }
            // Dropping the window cancels its expiry.
            self.windows.remove(session_id);
            info!(%session_id, "Consented leave during reconnection window");
            self.depart(session_id);
            return;
        }
        if !self.state.set_connected(session_id, false) {
            debug!(%session_id, "Leave from unseated participant ignored");
            return;
        }
        self.broadcast();

        if consented {
            self.depart(session_id);
            return;
        }

        let Some(commands) = self.commands.upgrade() else {
            self.depart(session_id);
            return;
        };
        self.next_generation += 1;
        let window = ReconnectionWindow::open(
            session_id.clone(),
            self.next_generation,
            self.config.reconnect_window(),
            commands,
        );
        info!(
            %session_id,
            generation = self.next_generation,
            window_secs = *self.config.reconnect_window_secs(),
            "Awaiting reconnection"
        );
        self.windows.insert(session_id.clone(), window);
    }

    /// Resumes a dropped seat if its window is still open.
    #[instrument(skip(self))]
    pub(crate) fn on_rejoin(&mut self, session_id: &SessionId) -> bool {
        if self.windows.remove(session_id).is_none() {
            warn!(%session_id, "No open reconnection window");
            return false;
        }
        self.state.set_connected(session_id, true);
        info!(%session_id, "Player reconnected");
        self.broadcast();
        true
    }

    /// Removes a dropped player whose window ran out.
    #[instrument(skip(self))]
    pub(crate) fn on_reconnect_expired(&mut self, session_id: &SessionId, generation: u64) {
        let current = self.windows.get(session_id).map(ReconnectionWindow::generation);
        if current != Some(generation) {
            debug!(%session_id, ?current, "Stale expiry ignored");
            return;
        }
        self.windows.remove(session_id);
        self.depart(session_id);
    }

    /// Permanent departure: remove, zero all scores, restart for whoever remains.
    fn depart(&mut self, session_id: &SessionId) {
        if self.state.remove_player(session_id).is_none() {
            return;
        }
        self.state.reset_scores();
        self.restart();
        info!(%session_id, remaining = self.state.players().len(), "Player removed");
        self.broadcast();
    }

    /// Lowers the restart pulse if no newer restart happened since.
    #[instrument(skip(self))]
    pub(crate) fn on_pulse_elapsed(&mut self, epoch: u64) {
        if self.pulse.as_ref().is_some_and(|p| p.epoch() == epoch) {
            self.pulse = None;
        }
        if self.state.clear_restart_pulse(epoch) {
            self.broadcast();
        }
    }

    /// Cancels every pending timer.
    pub(crate) fn shutdown(&mut self) {
        debug!(windows = self.windows.len(), "Cancelling room timers");
        self.windows.clear();
        self.pulse = None;
    }
}
