//! Error types for the session layer.

use devour_protocol::ClientId;

/// Errors returned by the [`ReconnectionManager`](crate::ReconnectionManager).
///
/// Both are expected outcomes of racing events. Rooms treat them as
/// no-ops rather than faults.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No grace period is running for this client. It either never
    /// disconnected, already reconnected, or already expired.
    #[error("no grace period pending for client {0}")]
    NoGracePeriod(ClientId),

    /// An expiry arrived for a timer that has since been cancelled or
    /// superseded by a newer grace period.
    #[error("stale grace expiry for client {0}")]
    StaleExpiry(ClientId),
}
