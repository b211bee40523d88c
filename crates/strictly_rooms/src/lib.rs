//! Strictly Rooms - authoritative two-player tic-tac-toe rooms
//!
//! Hosts one [`GameSession`](strictly_rules::GameSession) per room and
//! arbitrates every request against it.
//!
//! # Architecture
//!
//! - **Registry**: creates and tears down rooms ([`RoomRegistry`])
//! - **Room**: one task per room draining a command queue in arrival order
//!   ([`RoomHandle`])
//! - **Controller**: admission, turn arbitration, reconnection windows and
//!   restart pulses
//! - **Outbound**: the seam the transport implements to receive snapshots,
//!   error notices and forced disconnects ([`Outbound`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_rooms::{ChannelOutbound, ClientMessage, JoinOptions, RoomConfig, RoomRegistry};
//! use strictly_rules::SessionId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (outbound, mut events) = ChannelOutbound::channel();
//! let registry = RoomRegistry::new(RoomConfig::default(), Arc::new(outbound));
//!
//! let room = registry.create_room("tic_tac_toe".into())?;
//! room.join(SessionId::from("a"), JoinOptions::new("Alice"))?;
//! room.join(SessionId::from("b"), JoinOptions::new("Bob"))?;
//! room.send(SessionId::from("a"), ClientMessage::MakeMove { index: 4 })?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod controller;
mod error;
mod message;
mod outbound;
mod registry;
mod room;
mod script;
mod timers;

pub use config::{ConfigError, RoomConfig, Settings};
pub use error::{ErrorNotice, RequestError, RoomError, RoomErrorKind};
pub use message::{ClientMessage, JoinOptions, RoomId};
pub use outbound::{ChannelOutbound, Outbound, OutboundEvent, TracingOutbound};
pub use registry::RoomRegistry;
pub use room::{RoomHandle, spawn_room};
pub use script::{Script, Step};
