//! Fruit placement.

use rand::Rng;

use crate::{Bounds, FRUIT_COLORS, Fruit, WorldState};

/// Returns a point drawn uniformly from the area where a circle of radius
/// `margin` fits entirely inside `bounds`.
pub fn random_position<R: Rng + ?Sized>(bounds: Bounds, margin: f64, rng: &mut R) -> (f64, f64) {
    let x = margin + rng.random::<f64>() * (bounds.width - 2.0 * margin);
    let y = margin + rng.random::<f64>() * (bounds.height - 2.0 * margin);
    (x, y)
}

/// Produces fruit at random wall-safe positions.
#[derive(Debug, Clone)]
pub struct FruitSpawner {
    bounds: Bounds,
    fruit_radius: f64,
}

impl FruitSpawner {
    pub fn new(bounds: Bounds, fruit_radius: f64) -> Self {
        Self {
            bounds,
            fruit_radius,
        }
    }

    /// Creates one fruit. It is not inserted anywhere.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Fruit {
        let (x, y) = random_position(self.bounds, self.fruit_radius, rng);
        Fruit {
            x,
            y,
            color: FRUIT_COLORS[rng.random_range(0..FRUIT_COLORS.len())],
        }
    }

    /// Spawns `count` fruit into `world`.
    pub fn populate<R: Rng + ?Sized>(&self, world: &mut WorldState, count: usize, rng: &mut R) {
        for _ in 0..count {
            world.insert_fruit(self.spawn(rng));
        }
    }
}
