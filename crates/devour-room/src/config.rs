//! Room configuration and state machine.

use std::time::Duration;

use devour_protocol::JoinOptions;
use devour_tick::TickConfig;
use devour_world::{Bounds, WorldConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a room instance.
///
/// Field names map to the camelCase option keys clients send when a room
/// is created (`tickIntervalMs`, `worldWidth`, ...). Missing keys take the
/// defaults below; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomConfig {
    /// Advertised client limit. Used for matchmaking by the
    /// [`RoomManager`](crate::RoomManager); the room itself does not
    /// refuse joins.
    pub max_clients: usize,

    pub tick_interval_ms: u64,

    pub world_width: f64,
    pub world_height: f64,

    pub initial_fruit_count: usize,
    pub fruit_radius: f64,

    pub player_init_radius: f64,
    pub player_init_speed: f64,
    pub player_min_speed: f64,

    pub fruit_growth_increment: f64,
    pub fruit_speed_decrement: f64,

    /// How long a disconnected player is kept before removal.
    pub reconnection_grace_seconds: f64,

    /// Dispose the room once its last player is removed.
    pub auto_dispose: bool,

    /// Whether offline players can be eaten during their grace period.
    pub offline_players_collide: bool,

    /// Seed for spawn positions, colours, and headings. `None` seeds from
    /// the OS.
    pub rng_seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            max_clients: 20,
            tick_interval_ms: 16,
            world_width: world.bounds.width,
            world_height: world.bounds.height,
            initial_fruit_count: world.initial_fruit_count,
            fruit_radius: world.fruit_radius,
            player_init_radius: world.player_init_radius,
            player_init_speed: world.player_init_speed,
            player_min_speed: world.player_min_speed,
            fruit_growth_increment: world.fruit_growth_increment,
            fruit_speed_decrement: world.fruit_speed_decrement,
            reconnection_grace_seconds: 30.0,
            auto_dispose: true,
            offline_players_collide: world.offline_players_collide,
            rng_seed: None,
        }
    }
}

impl RoomConfig {
    /// Parses a room config from a client option map.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidOptions`] if a known key holds a value
    /// of the wrong type.
    pub fn from_options(options: &JoinOptions) -> Result<Self, RoomError> {
        serde_json::from_value(serde_json::Value::Object(options.clone()))
            .map_err(|e| RoomError::InvalidOptions(e.to_string()))
    }

    /// Clamps values that would break the simulation.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.tick_interval_ms == 0 {
            warn!("tickIntervalMs is zero, using 1");
            self.tick_interval_ms = 1;
        }
        if !(self.fruit_radius.is_finite() && self.fruit_radius > 0.0) {
            warn!(fruit_radius = self.fruit_radius, "invalid fruitRadius, using default");
            self.fruit_radius = defaults.fruit_radius;
        }
        if !(self.player_init_radius.is_finite() && self.player_init_radius > 0.0) {
            warn!(
                player_init_radius = self.player_init_radius,
                "invalid playerInitRadius, using default"
            );
            self.player_init_radius = defaults.player_init_radius;
        }
        if !(self.player_min_speed.is_finite() && self.player_min_speed >= 0.0) {
            warn!(player_min_speed = self.player_min_speed, "invalid playerMinSpeed, using 0");
            self.player_min_speed = 0.0;
        }
        if !(self.player_init_speed.is_finite() && self.player_init_speed >= self.player_min_speed) {
            warn!(
                player_init_speed = self.player_init_speed,
                player_min_speed = self.player_min_speed,
                "playerInitSpeed below playerMinSpeed, raising it"
            );
            self.player_init_speed = self.player_min_speed;
        }

        let smallest = 2.0 * self.player_init_radius.max(self.fruit_radius);
        if !(self.world_width.is_finite() && self.world_width >= smallest) {
            warn!(world_width = self.world_width, smallest, "world too narrow, widening");
            self.world_width = smallest;
        }
        if !(self.world_height.is_finite() && self.world_height >= smallest) {
            warn!(world_height = self.world_height, smallest, "world too short, heightening");
            self.world_height = smallest;
        }

        if !(self.reconnection_grace_seconds.is_finite() && self.reconnection_grace_seconds >= 0.0) {
            warn!(
                grace = self.reconnection_grace_seconds,
                "invalid reconnectionGraceSeconds, using 0"
            );
            self.reconnection_grace_seconds = 0.0;
        }
        self
    }

    /// The world subset of this config.
    pub fn world(&self) -> WorldConfig {
        WorldConfig {
            bounds: Bounds::new(self.world_width, self.world_height),
            initial_fruit_count: self.initial_fruit_count,
            fruit_radius: self.fruit_radius,
            player_init_radius: self.player_init_radius,
            player_init_speed: self.player_init_speed,
            player_min_speed: self.player_min_speed,
            fruit_growth_increment: self.fruit_growth_increment,
            fruit_speed_decrement: self.fruit_speed_decrement,
            offline_players_collide: self.offline_players_collide,
        }
    }

    pub fn tick(&self) -> TickConfig {
        TickConfig::with_interval(self.tick_interval())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reconnection grace period. Only meaningful on a validated config.
    pub fn reconnection_grace(&self) -> Duration {
        Duration::from_secs_f64(self.reconnection_grace_seconds.max(0.0))
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions are strictly ordered, no skipping states:
///
/// ```text
/// Created → Active → Disposing → Disposed
/// ```
///
/// - **Created**: Actor spawned, world built, loop not yet running.
/// - **Active**: Ticking and accepting joins, leaves, and messages.
/// - **Disposing**: Last player removed (or disposal requested). Grace
///   timers are being cancelled; no further commands are handled.
/// - **Disposed**: Actor stopped. Handles report
///   [`RoomError::Unavailable`](crate::RoomError::Unavailable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Created,
    Active,
    Disposing,
    Disposed,
}

impl RoomState {
    /// Returns `true` if the room handles commands and ticks.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once the room is going away.
    pub fn is_closing(&self) -> bool {
        matches!(self, Self::Disposing | Self::Disposed)
    }

    /// The state after this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Active),
            Self::Active => Some(Self::Disposing),
            Self::Disposing => Some(Self::Disposed),
            Self::Disposed => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Active => write!(f, "Active"),
            Self::Disposing => write!(f, "Disposing"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}
