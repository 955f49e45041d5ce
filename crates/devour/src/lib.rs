//! # Devour
//!
//! Authoritative simulation core for realtime arena rooms: players roam a
//! bounded world, eat fruit to grow, and eat smaller players.
//!
//! The transport stays outside. It feeds joins, leaves, and client
//! messages into a room and drains the [`Outbound`](devour_room::Outbound)
//! channel it handed to the [`RoomManager`](devour_room::RoomManager).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use devour::prelude::*;
//!
//! # async fn run() -> Result<(), DevourError> {
//! let (outbound_tx, mut outbound_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut rooms = RoomManager::new(outbound_tx);
//!
//! let (room_id, _) = rooms.join_or_create(ClientId::from("alice"), &JoinOptions::new()).await?;
//! rooms.route_payload(ClientId::from("alice"), br#"{"op":"angle","angle":90}"#).await?;
//! rooms.route_message(ClientId::from("alice"), ClientMessage::Ping).await?;
//!
//! let pong = outbound_rx.recv().await;
//! let snapshot = rooms.room(room_id).map(RoomHandle::snapshot);
//! # let _ = (pong, snapshot);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::DevourError;

pub use devour_protocol as protocol;
pub use devour_room as room;
pub use devour_session as session;
pub use devour_tick as tick;
pub use devour_world as world;

pub mod prelude {
    pub use crate::DevourError;
    pub use devour_protocol::{ClientId, ClientMessage, FruitId, JoinOptions, RoomId, ServerMessage};
    pub use devour_room::{
        JoinOutcome, LeaveOutcome, Outbound, RoomConfig, RoomHandle, RoomInfo, RoomManager, RoomState,
        WorldSnapshot,
    };
    pub use devour_world::{Fruit, Player, WorldState};
}
