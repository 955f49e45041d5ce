//! The world of one Devour room and the rules that advance it.
//!
//! Everything here is synchronous and single-owner: a [`WorldState`] is
//! mutated only by whoever holds `&mut` to it (the room actor), so the
//! simulation never needs locks.
//!
//! # Key types
//!
//! - [`WorldState`]: players, fruits, and bounds of one room
//! - [`Simulation`]: runs one tick (motion → fruit → player collisions)
//! - [`FruitSpawner`]: places fruit so it never crosses a wall
//! - [`collision`]: circle-overlap predicates and the consumption rule
//! - [`motion`]: advancing and clamping a player

pub mod collision;
mod config;
mod entity;
pub mod motion;
mod simulation;
mod spawner;
mod state;

pub use config::{Bounds, FRUIT_COLORS, PLAYER_COLORS, WorldConfig};
pub use entity::{Fruit, Player};
pub use simulation::{Simulation, TickReport};
pub use spawner::{FruitSpawner, random_position};
pub use state::WorldState;
