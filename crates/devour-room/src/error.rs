//! Error types for the room layer.

use devour_protocol::{ClientId, RoomId};

/// Errors that can occur during room operations.
///
/// Gameplay no-ops (duplicate join, leave for an absent client, messages
/// from unknown clients) are not errors. They resolve to `Ok`.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room actor has shut down.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The client is already placed in a different room.
    #[error("client {0} already in room {1}")]
    AlreadyInRoom(ClientId, RoomId),

    /// The room options could not be parsed.
    #[error("invalid room options: {0}")]
    InvalidOptions(String),
}
