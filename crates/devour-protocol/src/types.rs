//! Identities and message shapes exchanged between a room and the
//! external session layer.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier the session layer assigns to a connected client.
///
/// Devour never parses it. It is unique within a room and stable for the
/// whole of a player's membership, including across a reconnection.
///
/// `Ord` is derived so the world can keep players in a `BTreeMap`, which
/// gives every tick the same resolution order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of one room (one isolated world).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Spawn-order key of a fruit.
///
/// Allocated from a counter owned by the room's world, so ids are unique
/// for the room's lifetime and never shared between rooms. Serialized in
/// its display form, `fr_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FruitId(pub u64);

impl fmt::Display for FruitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fr_{}", self.0)
    }
}

impl Serialize for FruitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FruitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.strip_prefix("fr_")
            .and_then(|n| n.parse().ok())
            .map(FruitId)
            .ok_or_else(|| de::Error::custom(format!("invalid fruit id `{raw}`")))
    }
}

// ---------------------------------------------------------------------------
// Join options
// ---------------------------------------------------------------------------

/// Free-form option map delivered with a join event (and with room
/// creation, where it carries the room configuration keys).
pub type JoinOptions = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// An application message sent by a client.
///
/// The wire shape is `{ "op": string, "angle"?: number }`:
///
/// ```text
/// { "op": "angle", "angle": 90 }   → ClientMessage::Angle { angle: 90.0 }
/// { "op": "ping" }                 → ClientMessage::Ping
/// { "op": "anything-else" }        → ClientMessage::Unknown
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ClientMessage {
    /// New heading, in degrees.
    Angle { angle: f64 },

    /// Latency probe. Answered with [`ServerMessage::Pong`] to the sender
    /// only.
    Ping,

    /// Any op the room does not recognize. Ignored.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Rejects values no room could apply.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a non-finite heading.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Angle { angle } if !angle.is_finite() => Err(ProtocolError::InvalidMessage(
                format!("angle must be finite, got {angle}"),
            )),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A message a room pushes to a single client.
///
/// World snapshots are not sent through here; they are published
/// separately and encoded by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMessage {
    /// Reply to [`ClientMessage::Ping`].
    Pong,
}
