//! One fixed-interval step of the world.
//!
//! For every online player, in client-id order:
//!
//! ```text
//! motion → fruit consumption → player consumption
//! ```
//!
//! Resolution is per player, not global. A player eaten earlier in the
//! tick is reset immediately and may still eat others when its own turn
//! comes.

use std::time::Duration;

use devour_protocol::{ClientId, FruitId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use crate::collision::can_consume;
use crate::{FruitSpawner, Player, WorldConfig, WorldState, motion};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fruits_eaten: usize,
    pub fruits_spawned: usize,
    pub players_eaten: usize,
}

/// Owns the tuning and randomness used to advance a [`WorldState`].
///
/// The world itself is passed in by `&mut` so the caller keeps sole
/// ownership of it between ticks.
#[derive(Debug)]
pub struct Simulation {
    config: WorldConfig,
    spawner: FruitSpawner,
    rng: StdRng,
}

impl Simulation {
    /// Creates a simulation. A `seed` makes every spawn position, colour,
    /// and heading reproducible; without one the generator is seeded from
    /// the OS.
    pub fn new(config: WorldConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let spawner = FruitSpawner::new(config.bounds, config.fruit_radius);
        Self {
            config,
            spawner,
            rng,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// A new world seeded with the initial fruit population.
    pub fn init_world(&mut self) -> WorldState {
        let mut world = WorldState::new(self.config.bounds);
        self.spawner
            .populate(&mut world, self.config.initial_fruit_count, &mut self.rng);
        world
    }

    /// A new player at a random position, ready to be inserted.
    pub fn spawn_player(&mut self) -> Player {
        Player::spawn(&self.config, &mut self.rng)
    }

    /// Advances `world` by `dt`.
    pub fn step(&mut self, world: &mut WorldState, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        let bounds = self.config.bounds;
        let ids: Vec<ClientId> = world.players().keys().cloned().collect();

        for id in &ids {
            match world.player_mut(id) {
                Some(player) if player.online => motion::advance(player, bounds, dt),
                _ => continue,
            }

            let eaten = self.resolve_fruit(world, id);
            report.fruits_eaten += eaten;
            report.fruits_spawned += eaten;
            report.players_eaten += self.resolve_players(world, id, &ids);
        }

        if report != TickReport::default() {
            trace!(
                fruits_eaten = report.fruits_eaten,
                players_eaten = report.players_eaten,
                "tick resolved consumption"
            );
        }
        report
    }

    /// Eats every fruit overlapping `id` and spawns one replacement per
    /// fruit eaten. Returns the number eaten.
    fn resolve_fruit(&mut self, world: &mut WorldState, id: &ClientId) -> usize {
        let Some(player) = world.player(id) else {
            return 0;
        };
        let body = player.circle();
        let fruit_radius = self.config.fruit_radius;

        // Collected first so this player cannot eat its own replacements.
        // Players later in the order can.
        let eaten: Vec<FruitId> = world
            .fruits()
            .iter()
            .filter(|(_, fruit)| body.overlaps(&fruit.circle(fruit_radius)))
            .map(|(fruit_id, _)| *fruit_id)
            .collect();

        for fruit_id in &eaten {
            world.remove_fruit(*fruit_id);
            if let Some(player) = world.player_mut(id) {
                player.feed_on_fruit(&self.config);
            }
            let replacement = self.spawner.spawn(&mut self.rng);
            world.insert_fruit(replacement);
        }
        eaten.len()
    }

    /// Lets `eater_id` consume every smaller overlapping player. The eater
    /// grows as it goes, so later candidates are tested against its new
    /// size. Returns the number of players eaten.
    fn resolve_players(&mut self, world: &mut WorldState, eater_id: &ClientId, ids: &[ClientId]) -> usize {
        let mut eaten = 0;
        for prey_id in ids.iter().filter(|prey_id| *prey_id != eater_id) {
            let (Some(eater), Some(prey)) = (world.player(eater_id), world.player(prey_id)) else {
                continue;
            };
            if !prey.online && !self.config.offline_players_collide {
                continue;
            }
            if !can_consume(&eater.circle(), &prey.circle()) {
                continue;
            }

            let prey_radius = prey.radius;
            if let Some(eater) = world.player_mut(eater_id) {
                eater.feed_on_player(prey_radius, &self.config);
            }
            if let Some(prey) = world.player_mut(prey_id) {
                prey.respawn(&self.config, &mut self.rng);
            }
            trace!(eater = %eater_id, prey = %prey_id, prey_radius, "player eaten");
            eaten += 1;
        }
        eaten
    }
}
