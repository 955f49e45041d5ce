//! Unified error type for Devour.

use devour_protocol::ProtocolError;
use devour_room::RoomError;
use devour_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum DevourError {
    /// Encode, decode, or invalid message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No pending grace period, or a stale expiry.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Room not found, unavailable, or misconfigured.
    #[error(transparent)]
    Room(#[from] RoomError),
}
