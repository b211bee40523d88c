//! Shared helpers for room tests.

#![allow(dead_code)]

use std::sync::Arc;
use strictly_rooms::{
    ChannelOutbound, ClientMessage, ErrorNotice, JoinOptions, OutboundEvent, RoomConfig,
    RoomHandle, RoomId, spawn_room,
};
use strictly_rules::{GameSession, SessionId};
use tokio::sync::mpsc::UnboundedReceiver;

/// A room wired to a channel outbound.
pub struct TestRoom {
    pub handle: RoomHandle,
    pub events: UnboundedReceiver<OutboundEvent>,
}

impl TestRoom {
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    pub fn with_config(config: RoomConfig) -> Self {
        let (outbound, events) = ChannelOutbound::channel();
        let handle = spawn_room(RoomId::from("test"), config, Arc::new(outbound));
        Self { handle, events }
    }

    pub fn join(&self, id: &str, name: &str) -> SessionId {
        let id = SessionId::from(id);
        self.handle
            .join(id.clone(), JoinOptions::new(name))
            .expect("room open");
        id
    }

    pub fn play(&self, id: &SessionId, index: i64) {
        self.handle
            .send(id.clone(), ClientMessage::MakeMove { index })
            .expect("room open");
    }

    pub fn restart(&self, id: &SessionId) {
        self.handle
            .send(id.clone(), ClientMessage::RestartGame)
            .expect("room open");
    }

    pub fn leave(&self, id: &SessionId, consented: bool) {
        self.handle.leave(id.clone(), consented).expect("room open");
    }

    pub async fn snapshot(&self) -> GameSession {
        self.handle.snapshot().await.expect("room open")
    }

    /// Everything the room has emitted so far.
    ///
    /// Call after `snapshot` so all earlier commands have been handled.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Error notices addressed to `id`, draining the queue.
    pub fn notices_for(&mut self, id: &SessionId) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                OutboundEvent::Error {
                    to,
                    notice: ErrorNotice { message },
                    ..
                } if &to == id => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Seats two players and plays a top-row win for the first.
    pub async fn seat_and_win_for_first(&mut self) -> (SessionId, SessionId) {
        let p1 = self.join("p1", "Alice");
        let p2 = self.join("p2", "Bob");
        for (id, index) in [(&p1, 0), (&p2, 3), (&p1, 1), (&p2, 4), (&p1, 2)] {
            self.play(id, index);
        }
        let state = self.snapshot().await;
        assert!(*state.game_over());
        self.drain();
        (p1, p2)
    }
}
