//! Geometric predicates for consumption.
//!
//! Everything works on squared distances; no square roots are taken.

use serde::{Deserialize, Serialize};

/// A circle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub fn distance_squared(&self, other: &Circle) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Strict overlap: circles that merely touch do not overlap.
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.distance_squared(other) < reach * reach
    }
}

/// Returns `true` if `eater` consumes `prey`.
///
/// The prey must be strictly smaller and the circles must overlap. Equal
/// radii never consume in either direction.
pub fn can_consume(eater: &Circle, prey: &Circle) -> bool {
    prey.radius < eater.radius && eater.overlaps(prey)
}
