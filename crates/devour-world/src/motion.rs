//! Player motion and wall clamping.

use std::time::Duration;

use crate::{Bounds, Player};

/// Moves `player` along its heading for `dt` and keeps its circle inside
/// `bounds`.
pub fn advance(player: &mut Player, bounds: Bounds, dt: Duration) {
    let step = player.speed * dt.as_secs_f64();
    let x = player.x + player.angle.cos() * step;
    let y = player.y + player.angle.sin() * step;
    player.x = x;
    player.y = y;
    player.clamp_to(bounds);
}

/// Clamps one coordinate so that `[value - radius, value + radius]` stays
/// within `[0, max]`. A circle wider than the axis is centred on it.
pub fn clamp_axis(value: f64, radius: f64, max: f64) -> f64 {
    if 2.0 * radius > max {
        max / 2.0
    } else if value - radius < 0.0 {
        radius
    } else if value + radius > max {
        max - radius
    } else {
        value
    }
}
