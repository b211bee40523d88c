//! Outbound seam towards the transport.
//!
//! The room calls these after it has mutated state; delivery, framing and
//! delta encoding belong to the transport.

use crate::error::ErrorNotice;
use crate::message::RoomId;
use strictly_rules::{GameSession, SessionId};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Delivers room output to participants.
pub trait Outbound: Send + Sync + 'static {
    /// Publishes the full state to every participant in the room.
    fn broadcast(&self, room: &RoomId, state: &GameSession);

    /// Sends an `"error"` notice to one participant only.
    fn notify(&self, room: &RoomId, to: &SessionId, notice: &ErrorNotice);

    /// Drops a participant's connection, used for capacity rejection.
    fn disconnect(&self, room: &RoomId, session_id: &SessionId);
}

/// One unit of room output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// State snapshot for everyone in the room.
    State {
        /// Room the snapshot belongs to.
        room: RoomId,
        /// Snapshot after the mutation.
        state: GameSession,
    },
    /// Notice for a single participant.
    Error {
        /// Room the notice came from.
        room: RoomId,
        /// Recipient.
        to: SessionId,
        /// Notice body.
        notice: ErrorNotice,
    },
    /// Forced disconnect of a participant.
    Disconnect {
        /// Room doing the disconnect.
        room: RoomId,
        /// Participant to drop.
        session_id: SessionId,
    },
}

/// Outbound that forwards every event into a channel.
#[derive(Debug, Clone)]
pub struct ChannelOutbound {
    tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl ChannelOutbound {
    /// Creates the outbound and the receiver the transport drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: OutboundEvent) {
        if self.tx.send(event).is_err() {
            debug!("Outbound receiver dropped");
        }
    }
}

impl Outbound for ChannelOutbound {
    fn broadcast(&self, room: &RoomId, state: &GameSession) {
        self.send(OutboundEvent::State {
            room: room.clone(),
            state: state.clone(),
        });
    }

    fn notify(&self, room: &RoomId, to: &SessionId, notice: &ErrorNotice) {
        self.send(OutboundEvent::Error {
            room: room.clone(),
            to: to.clone(),
            notice: notice.clone(),
        });
    }

    fn disconnect(&self, room: &RoomId, session_id: &SessionId) {
        self.send(OutboundEvent::Disconnect {
            room: room.clone(),
            session_id: session_id.clone(),
        });
    }
}

/// Outbound that logs snapshots as JSON instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutbound;

impl Outbound for TracingOutbound {
    #[instrument(skip(self, state))]
    fn broadcast(&self, room: &RoomId, state: &GameSession) {
        match serde_json::to_string(state) {
            Ok(json) => info!(state = %json, "Broadcast"),
            Err(e) => warn!(error = %e, "Failed to encode snapshot"),
        }
        debug!("\n{}", state.board().display());
    }

    #[instrument(skip(self))]
    fn notify(&self, room: &RoomId, to: &SessionId, notice: &ErrorNotice) {
        info!(message = %notice.message, "Error notice");
    }

    #[instrument(skip(self))]
    fn disconnect(&self, room: &RoomId, session_id: &SessionId) {
        info!("Forced disconnect");
    }
}
