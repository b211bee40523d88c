//! Cancellable timers that report back into a room's command queue.
//!
//! A timer never touches session state. When it fires it enqueues a
//! command, so the room task sees the expiry in order with every other
//! request. Dropping a timer cancels it.

use crate::room::RoomCommand;
use std::time::Duration;
use strictly_rules::SessionId;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// Grace period during which a dropped player may rejoin.
#[derive(Debug)]
pub(crate) struct ReconnectionWindow {
    generation: u64,
    _guard: DropGuard,
}

impl ReconnectionWindow {
    /// Starts the window; on expiry the room receives `ReconnectExpired`.
    pub(crate) fn open(
        session_id: SessionId,
        generation: u64,
        window: Duration,
        commands: mpsc::UnboundedSender<RoomCommand>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {
                    debug!(%session_id, generation, "Reconnection window closed");
                }
                () = tokio::time::sleep(window) => {
                    debug!(%session_id, generation, "Reconnection window expired");
                    let expired = RoomCommand::ReconnectExpired { session_id, generation };
                    if commands.send(expired).is_err() {
                        debug!("Room stopped before expiry was delivered");
                    }
                }
            }
        });
        Self {
            generation,
            _guard: token.drop_guard(),
        }
    }

    /// Identifies this window among successive disconnects of one player.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

/// Pending clear of the restart pulse.
#[derive(Debug)]
pub(crate) struct PulseTimer {
    epoch: u64,
    _guard: DropGuard,
}

impl PulseTimer {
    /// After `delay` the room receives `PulseElapsed { epoch }`.
    pub(crate) fn schedule(
        epoch: u64,
        delay: Duration,
        commands: mpsc::UnboundedSender<RoomCommand>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {
                    debug!(epoch, "Pulse clear superseded");
                }
                () = tokio::time::sleep(delay) => {
                    if commands.send(RoomCommand::PulseElapsed { epoch }).is_err() {
                        debug!("Room stopped before pulse clear was delivered");
                    }
                }
            }
        });
        Self {
            epoch,
            _guard: token.drop_guard(),
        }
    }

    /// Restart epoch this timer clears.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
}
