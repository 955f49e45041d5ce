//! Message shapes and identities shared by every Devour layer.
//!
//! - **Types** ([`ClientId`], [`RoomId`], [`FruitId`], [`ClientMessage`],
//!   [`ServerMessage`], [`JoinOptions`]): what the transport
//!   hands to a room and what a room hands back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): turning raw inbound
//!   payloads into [`ClientMessage`] values and outbound messages into bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! Framing and transport are not handled here. This crate only knows what
//! a message looks like once a transport has delivered its bytes.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{ClientId, ClientMessage, FruitId, JoinOptions, RoomId, ServerMessage};
