//! Axis-separated movement against the tile grid
//!
//! Not a swept solver: each axis is probed independently, X before Y. A body
//! pushing diagonally into a wall loses only the blocked component and slides
//! along the other. The X-first order decides which way corners resolve and
//! must not change.

use glam::{Vec2, Vec3};

use super::collision::is_blocked;
use super::grid::TileGrid;

/// Advance `pos` by `vel * dt`, stopping on whichever axis is blocked.
///
/// A blocked axis keeps its old coordinate and has its velocity zeroed.
pub fn move_with_collision(pos: &mut Vec3, vel: &mut Vec3, dt: f32, radius: f32, grid: &TileGrid) {
    let next_x = pos.x + vel.x * dt;
    let next_y = pos.y + vel.y * dt;

    if is_blocked(Vec3::new(next_x, pos.y, pos.z), radius, grid) {
        vel.x = 0.0;
    } else {
        pos.x = next_x;
    }

    if is_blocked(Vec3::new(pos.x, next_y, pos.z), radius, grid) {
        vel.y = 0.0;
    } else {
        pos.y = next_y;
    }
}

/// Turn a raw input direction into a planar velocity of the given speed.
///
/// Diagonals are normalized so they are not faster than straight moves; a
/// zero direction gives zero velocity.
pub fn intent_velocity(dir: Vec2, speed: f32) -> Vec3 {
    (dir.normalize_or_zero() * speed).extend(0.0)
}

/// Instant burst of movement (dash ability).
///
/// Moves `pos` as if travelling at `speed` along `dir` for `duration` seconds
/// in a single step. Returns false when there is no direction to dash in.
pub fn dash(pos: &mut Vec3, dir: Vec2, speed: f32, duration: f32, radius: f32, grid: &TileGrid) -> bool {
    let Some(dir) = dir.try_normalize() else {
        return false;
    };
    let mut vel = (dir * speed).extend(0.0);
    move_with_collision(pos, &mut vel, duration, radius, grid);
    true
}
