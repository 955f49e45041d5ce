//! World tuning and bounds.

use serde::{Deserialize, Serialize};

/// Colours handed out to joining players (RGBA).
pub const PLAYER_COLORS: [u32; 17] = [
    0x4cb0_50ff,
    0xe619_4bff, 0x3cb4_4bff, 0xffe1_19ff, 0x4363_d8ff,
    0xf582_31ff, 0x911e_b4ff, 0x46f0_f0ff, 0xf032_e6ff,
    0xbcf6_0cff, 0xfabe_beff, 0x0080_80ff, 0xe6be_ffff,
    0x9a63_24ff, 0xfffa_c8ff, 0x8000_00ff, 0xaaff_c3ff,
];

/// Colours a fruit may take (RGBA).
pub const FRUIT_COLORS: [u32; 3] = [0xff00_00ff, 0x00ff_00ff, 0x0000_ffff];

/// Rectangular world extent. The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if a circle at `(x, y)` lies fully inside.
    pub fn contains_circle(&self, x: f64, y: f64, radius: f64) -> bool {
        x >= radius && x <= self.width - radius && y >= radius && y <= self.height - radius
    }
}

/// Tuning for the world simulation. Owned by the room, copied into the
/// [`Simulation`](crate::Simulation) at room start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub bounds: Bounds,

    /// Fruit seeded at room start. The population stays at this value.
    pub initial_fruit_count: usize,

    pub fruit_radius: f64,

    /// Radius of a freshly joined (or freshly eaten) player.
    pub player_init_radius: f64,

    /// Speed of a freshly joined player, in world units per second.
    pub player_init_speed: f64,

    /// Speed floor. Eating never slows a player below this.
    pub player_min_speed: f64,

    /// Radius gained per fruit.
    pub fruit_growth_increment: f64,

    /// Speed lost per fruit.
    pub fruit_speed_decrement: f64,

    /// Whether players awaiting reconnection can still be eaten.
    ///
    /// Offline players never move or eat. With this set they remain
    /// targets for online players; without it they are inert.
    pub offline_players_collide: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let fruit_radius = 10.0;
        Self {
            bounds: Bounds::new(1200.0, 1200.0),
            initial_fruit_count: 50,
            fruit_radius,
            player_init_radius: 40.0,
            player_init_speed: 120.0,
            player_min_speed: 40.0,
            fruit_growth_increment: fruit_radius / 10.0,
            fruit_speed_decrement: fruit_radius / 30.0,
            offline_players_collide: true,
        }
    }
}
