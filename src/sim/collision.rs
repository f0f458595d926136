//! Circle vs tile grid collision
//!
//! A probe circle is tested against every solid tile under its bounding box,
//! in row-major order. The first touching tile wins, even if a later tile is
//! closer: corner behavior in movement depends on this scan order.

use glam::{Vec2, Vec3};

use super::grid::TileGrid;

/// Contact between a probe circle and a solid tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the tile surface toward the probe center
    pub normal: Vec2,
    pub tile_x: usize,
    pub tile_y: usize,
}

/// Find the first solid tile touched by a circle at `pos` with `radius`.
///
/// Tiles whose obstruction height is below `pos.z` are ignored. Touching
/// (distance exactly equal to the radius) counts as contact.
pub fn resolve(pos: Vec3, radius: f32, grid: &TileGrid) -> Option<Contact> {
    let ts = grid.tile_size();
    let max_x = grid.width() as i32 - 1;
    let max_y = grid.height() as i32 - 1;

    // Tile bounding box of the circle, clamped to the grid
    let clamp_x = |v: f32| ((v / ts).floor() as i32).max(0).min(max_x) as usize;
    let clamp_y = |v: f32| ((v / ts).floor() as i32).max(0).min(max_y) as usize;
    let (min_tx, max_tx) = (clamp_x(pos.x - radius), clamp_x(pos.x + radius));
    let (min_ty, max_ty) = (clamp_y(pos.y - radius), clamp_y(pos.y + radius));

    for ty in min_ty..=max_ty {
        for tx in min_tx..=max_tx {
            if !grid.cell_at(tx, ty).blocks_at(pos.z) {
                continue;
            }

            let left = tx as f32 * ts;
            let right = left + ts;
            let top = ty as f32 * ts;
            let bottom = top + ts;

            let closest = Vec2::new(pos.x.clamp(left, right), pos.y.clamp(top, bottom));
            let offset = pos.truncate() - closest;
            if offset.length_squared() > radius * radius {
                continue;
            }

            let normal = match offset.try_normalize() {
                Some(n) => n,
                // Center on or inside the tile: push out through the nearest edge
                None => nearest_edge_normal(pos.truncate(), left, right, top, bottom),
            };
            return Some(Contact {
                normal,
                tile_x: tx,
                tile_y: ty,
            });
        }
    }

    None
}

/// Whether a circle at `pos` touches any solid tile
#[inline]
pub fn is_blocked(pos: Vec3, radius: f32, grid: &TileGrid) -> bool {
    resolve(pos, radius, grid).is_some()
}

/// Axis-aligned outward normal of the tile edge nearest to `p`.
///
/// Ties resolve left, right, top, bottom in that order.
fn nearest_edge_normal(p: Vec2, left: f32, right: f32, top: f32, bottom: f32) -> Vec2 {
    let to_left = (p.x - left).abs();
    let to_right = (right - p.x).abs();
    let to_top = (p.y - top).abs();
    let to_bottom = (bottom - p.y).abs();

    let min = to_left.min(to_right).min(to_top).min(to_bottom);
    if min == to_left {
        Vec2::NEG_X
    } else if min == to_right {
        Vec2::X
    } else if min == to_top {
        Vec2::NEG_Y
    } else {
        Vec2::Y
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
