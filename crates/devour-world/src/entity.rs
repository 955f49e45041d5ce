//! Players and fruit.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::Circle;
use crate::{Bounds, FRUIT_COLORS, PLAYER_COLORS, WorldConfig, motion, random_position};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player's body in the world.
///
/// `radius` only ever grows while the player lives and `speed` only ever
/// falls (to the configured floor). Being eaten resets the radius but
/// keeps the speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Heading in radians.
    pub angle: f64,
    /// World units per second.
    pub speed: f64,
    pub color: u32,
    /// `false` while the player is disconnected and inside its grace
    /// period.
    pub online: bool,
}

impl Player {
    /// A player at `(x, y)` with the configured starting size and speed,
    /// heading along `+x`.
    pub fn new(x: f64, y: f64, config: &WorldConfig) -> Self {
        Self {
            x,
            y,
            radius: config.player_init_radius,
            angle: 0.0,
            speed: config.player_init_speed,
            color: PLAYER_COLORS[0],
            online: true,
        }
    }

    /// A freshly joined player: random in-bounds position, random heading,
    /// random palette colour.
    pub fn spawn<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        let (x, y) = random_position(config.bounds, config.player_init_radius, rng);
        Self {
            angle: rng.random_range(-PI..PI),
            color: PLAYER_COLORS[rng.random_range(0..PLAYER_COLORS.len())],
            ..Self::new(x, y, config)
        }
    }

    /// Sets the heading from a value in degrees.
    pub fn set_heading_degrees(&mut self, degrees: f64) {
        self.angle = degrees.to_radians();
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.radius)
    }

    /// Pulls the centre back so the circle sits inside `bounds`.
    pub fn clamp_to(&mut self, bounds: Bounds) {
        self.x = motion::clamp_axis(self.x, self.radius, bounds.width);
        self.y = motion::clamp_axis(self.y, self.radius, bounds.height);
    }

    /// Growth and slowdown from eating one fruit.
    pub(crate) fn feed_on_fruit(&mut self, config: &WorldConfig) {
        self.radius += config.fruit_growth_increment;
        self.slow_down(config.fruit_speed_decrement, config.player_min_speed);
        self.clamp_to(config.bounds);
    }

    /// Growth and slowdown from eating a player of radius `prey_radius`.
    pub(crate) fn feed_on_player(&mut self, prey_radius: f64, config: &WorldConfig) {
        self.radius += prey_radius / 10.0;
        self.slow_down(prey_radius / 20.0, config.player_min_speed);
        self.clamp_to(config.bounds);
    }

    /// Puts an eaten player back at starting size somewhere else. Speed,
    /// heading, colour and online state are kept.
    pub(crate) fn respawn<R: Rng + ?Sized>(&mut self, config: &WorldConfig, rng: &mut R) {
        let (x, y) = random_position(config.bounds, config.player_init_radius, rng);
        self.x = x;
        self.y = y;
        self.radius = config.player_init_radius;
    }

    fn slow_down(&mut self, by: f64, floor: f64) {
        self.speed = (self.speed - by).max(floor);
    }
}

// ---------------------------------------------------------------------------
// Fruit
// ---------------------------------------------------------------------------

/// A stationary fruit. All fruit share the world's `fruit_radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fruit {
    pub x: f64,
    pub y: f64,
    pub color: u32,
}

impl Fruit {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            color: FRUIT_COLORS[0],
        }
    }

    pub fn circle(&self, fruit_radius: f64) -> Circle {
        Circle::new(self.x, self.y, fruit_radius)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_spawn_within_bounds_with_palette_color() {
        let config = WorldConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Player::spawn(&config, &mut rng);
            assert!(config.bounds.contains_circle(p.x, p.y, p.radius));
            assert!(PLAYER_COLORS.contains(&p.color));
            assert!((-PI..PI).contains(&p.angle));
            assert!(p.online);
            assert_eq!(p.radius, config.player_init_radius);
            assert_eq!(p.speed, config.player_init_speed);
        }
    }

    #[test]
    fn test_set_heading_degrees_converts_to_radians() {
        let mut p = Player::new(100.0, 100.0, &WorldConfig::default());
        p.set_heading_degrees(90.0);
        assert!((p.angle - PI / 2.0).abs() < 1e-12);
        p.set_heading_degrees(-180.0);
        assert!((p.angle + PI).abs() < 1e-12);
    }

    #[test]
    fn test_feed_on_fruit_grows_and_slows() {
        let config = WorldConfig::default();
        let mut p = Player::new(100.0, 100.0, &config);
        p.feed_on_fruit(&config);
        assert_eq!(p.radius, config.player_init_radius + config.fruit_growth_increment);
        assert!(p.speed < config.player_init_speed);
    }

    #[test]
    fn test_slow_down_stops_at_floor() {
        let config = WorldConfig::default();
        let mut p = Player::new(100.0, 100.0, &config);
        p.speed = config.player_min_speed + 0.1;
        p.feed_on_fruit(&config);
        assert_eq!(p.speed, config.player_min_speed);
        p.feed_on_player(400.0, &config);
        assert_eq!(p.speed, config.player_min_speed);
    }

    #[test]
    fn test_growth_against_wall_pushes_centre_in() {
        let config = WorldConfig::default();
        let mut p = Player::new(40.0, 1160.0, &config);
        p.feed_on_fruit(&config);
        assert_eq!((p.x, p.y), (41.0, 1159.0));

        p.feed_on_player(30.0, &config);
        assert_eq!((p.x, p.y), (44.0, 1156.0));
        assert!(config.bounds.contains_circle(p.x, p.y, p.radius));
    }

    #[test]
    fn test_respawn_resets_radius_keeps_speed() {
        let config = WorldConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Player::new(100.0, 100.0, &config);
        p.radius = 95.0;
        p.speed = 77.0;
        p.respawn(&config, &mut rng);
        assert_eq!(p.radius, config.player_init_radius);
        assert_eq!(p.speed, 77.0);
        assert!(config.bounds.contains_circle(p.x, p.y, p.radius));
    }
}
