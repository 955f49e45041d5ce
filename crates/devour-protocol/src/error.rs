//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing `op`, or an
    /// `angle` op without a numeric `angle` field.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but carries a value the room cannot use,
    /// such as a non-finite heading.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
