//! Room lifecycle management for Devour.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! world exclusively. Joins, leaves, client messages, ticks, and grace
//! expiries all arrive on the actor's task and are handled one at a time,
//! so the world is never touched concurrently.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates rooms, routes clients, reaps disposed rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: room options (tick interval, world size, tuning)

mod config;
mod error;
mod manager;
mod room;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{JoinOutcome, LeaveOutcome, Outbound, OutboundSender, RoomHandle, RoomInfo, WorldSnapshot};
