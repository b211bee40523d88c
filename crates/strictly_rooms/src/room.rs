//! Per-room task and the handle the transport talks to.
//!
//! Every hook enqueues a [`RoomCommand`]; one task per room drains the
//! queue and hands each command to the controller in arrival order, so no
//! two handlers for the same session ever overlap.

use crate::config::RoomConfig;
use crate::controller::SessionController;
use crate::error::{RoomError, RoomErrorKind};
use crate::message::{ClientMessage, JoinOptions, RoomId};
use crate::outbound::Outbound;
use serde_json::Value;
use std::sync::Arc;
use strictly_rules::{GameSession, SessionId};
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span, instrument};

/// Work item for a room task.
#[derive(Debug)]
pub(crate) enum RoomCommand {
    Join {
        session_id: SessionId,
        options: JoinOptions,
    },
    Message {
        session_id: SessionId,
        message: ClientMessage,
    },
    Raw {
        session_id: SessionId,
        kind: String,
        payload: Value,
    },
    Leave {
        session_id: SessionId,
        consented: bool,
    },
    Rejoin {
        session_id: SessionId,
        reply: oneshot::Sender<bool>,
    },
    ReconnectExpired {
        session_id: SessionId,
        generation: u64,
    },
    PulseElapsed {
        epoch: u64,
    },
    Snapshot {
        reply: oneshot::Sender<GameSession>,
    },
    Close,
}

/// Cloneable handle to a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room: RoomId,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

/// Creates a fresh session and starts its room task.
#[instrument(skip(outbound))]
pub fn spawn_room(room: RoomId, config: RoomConfig, outbound: Arc<dyn Outbound>) -> RoomHandle {
    let (commands, queue) = mpsc::unbounded_channel();
    let controller = SessionController::new(room.clone(), config, outbound, commands.downgrade());
    let span = info_span!("room", room = %room);
    tokio::spawn(run(controller, queue).instrument(span));
    info!("Room created");
    RoomHandle { room, commands }
}

async fn run(mut controller: SessionController, mut queue: mpsc::UnboundedReceiver<RoomCommand>) {
    while let Some(command) = queue.recv().await {
        match command {
            RoomCommand::Join {
                session_id,
                options,
            } => controller.on_join(session_id, options),
            RoomCommand::Message {
                session_id,
                message,
            } => controller.on_message(&session_id, message),
            RoomCommand::Raw {
                session_id,
                kind,
                payload,
            } => controller.on_raw_message(&session_id, &kind, payload),
            RoomCommand::Leave {
                session_id,
                consented,
            } => controller.on_leave(&session_id, consented),
            RoomCommand::Rejoin { session_id, reply } => {
                let resumed = controller.on_rejoin(&session_id);
                if reply.send(resumed).is_err() {
                    debug!(%session_id, "Rejoin caller went away");
                }
            }
            RoomCommand::ReconnectExpired {
                session_id,
                generation,
            } => controller.on_reconnect_expired(&session_id, generation),
            RoomCommand::PulseElapsed { epoch } => controller.on_pulse_elapsed(epoch),
            RoomCommand::Snapshot { reply } => {
                if reply.send(controller.state().clone()).is_err() {
                    debug!("Snapshot caller went away");
                }
            }
            RoomCommand::Close => break,
        }
    }
    controller.shutdown();
    info!("Room closed");
}

impl RoomHandle {
    /// Room this handle points at.
    pub fn id(&self) -> &RoomId {
        &self.room
    }

    /// True once the room task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    #[track_caller]
    fn enqueue(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.commands
            .send(command)
            .map_err(|_| RoomError::new(RoomErrorKind::Closed(self.room.to_string())))
    }

    /// A participant joined the room.
    #[instrument(skip(self, options), fields(room = %self.room))]
    pub fn join(&self, session_id: SessionId, options: JoinOptions) -> Result<(), RoomError> {
        self.enqueue(RoomCommand::Join {
            session_id,
            options,
        })
    }

    /// A seated participant sent a decoded game message.
    #[instrument(skip(self), fields(room = %self.room))]
    pub fn send(&self, session_id: SessionId, message: ClientMessage) -> Result<(), RoomError> {
        self.enqueue(RoomCommand::Message {
            session_id,
            message,
        })
    }

    /// A participant sent `(type, payload)` straight off the wire.
    ///
    /// Payloads that fail to decode are answered with an error notice.
    #[instrument(skip(self, payload), fields(room = %self.room))]
    pub fn send_raw(
        &self,
        session_id: SessionId,
        kind: &str,
        payload: Value,
    ) -> Result<(), RoomError> {
        self.enqueue(RoomCommand::Raw {
            session_id,
            kind: kind.to_string(),
            payload,
        })
    }

    /// A participant's connection ended.
    #[instrument(skip(self), fields(room = %self.room))]
    pub fn leave(&self, session_id: SessionId, consented: bool) -> Result<(), RoomError> {
        self.enqueue(RoomCommand::Leave {
            session_id,
            consented,
        })
    }

    /// A dropped participant reconnected with the same id.
    ///
    /// Resolves to `true` if the reconnection window was still open and the
    /// seat was resumed, `false` if it had already expired.
    #[instrument(skip(self), fields(room = %self.room))]
    pub async fn rejoin(&self, session_id: SessionId) -> Result<bool, RoomError> {
        let (reply, resumed) = oneshot::channel();
        self.enqueue(RoomCommand::Rejoin { session_id, reply })?;
        resumed
            .await
            .map_err(|_| RoomError::new(RoomErrorKind::Closed(self.room.to_string())))
    }

    /// Current replicated state, after every command queued before it.
    pub async fn snapshot(&self) -> Result<GameSession, RoomError> {
        let (reply, state) = oneshot::channel();
        self.enqueue(RoomCommand::Snapshot { reply })?;
        state
            .await
            .map_err(|_| RoomError::new(RoomErrorKind::Closed(self.room.to_string())))
    }

    /// Tears the room down, cancelling its timers.
    #[instrument(skip(self), fields(room = %self.room))]
    pub fn close(&self) -> Result<(), RoomError> {
        self.enqueue(RoomCommand::Close)
    }
}
