//! Inbound payloads from the transport.

use crate::error::RequestError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

/// Identifier of a hosted room.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a room name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Options a participant supplies when joining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    /// Name shown to the other participant.
    #[serde(alias = "name")]
    pub display_name: String,
}

impl JoinOptions {
    /// Creates join options with a display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// A game message sent by a seated participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClientMessage {
    /// Place a mark at a board index.
    ///
    /// Signed so that negative indices reach validation and are rejected
    /// as invalid moves rather than as malformed payloads.
    MakeMove {
        /// Board index, 0-8.
        index: i64,
    },
    /// Start a new round after the current one concluded.
    RestartGame,
}

impl ClientMessage {
    /// Message type name as the transport sends it.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Decodes a `(type, payload)` pair as delivered by the transport.
    #[instrument(skip(payload))]
    pub fn decode(kind: &str, payload: Value) -> Result<Self, RequestError> {
        let mut body = match payload {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                warn!(payload = %other, "Payload is not an object");
                return Err(RequestError::Malformed(kind.to_string()));
            }
        };
        body.insert("type".to_string(), Value::String(kind.to_string()));
        serde_json::from_value(Value::Object(body)).map_err(|e| {
            warn!(error = %e, "Failed to decode message");
            RequestError::Malformed(kind.to_string())
        })
    }
}
