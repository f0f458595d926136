//! Bouncing projectiles
//!
//! Projectiles integrate freely and reflect off walls instead of stopping.
//! They share the collision resolver with the mover so both agree on where
//! walls are.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::body::Kinematics;
use super::collision::{reflect_velocity, resolve};
use super::grid::TileGrid;
use crate::consts::PUSH_OUT_EPSILON;

/// A bounce off a wall during one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub normal: Vec2,
    pub tile_x: usize,
    pub tile_y: usize,
    /// Planar speed after restitution
    pub speed: f32,
}

/// A ballistic body that reflects off solid tiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Kinematics,
    pub radius: f32,
    /// Fraction of speed kept after a bounce (1.0 = perfectly elastic)
    pub bounciness: f32,
}

impl Projectile {
    pub fn new(body: Kinematics, radius: f32) -> Self {
        Self {
            body,
            radius,
            bounciness: 1.0,
        }
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }

    /// Projectile at `from` heading toward `to` at `speed`.
    ///
    /// Returns `None` when the two points coincide (no direction to fire in).
    pub fn aimed(from: Vec3, to: Vec3, speed: f32, radius: f32) -> Option<Self> {
        let dir = (to - from).truncate().try_normalize()?;
        let body = Kinematics::at(from.with_z(0.0)).with_velocity((dir * speed).extend(0.0));
        Some(Self::new(body, radius))
    }

    /// Integrate one step, then bounce off any wall the projectile ended up in.
    ///
    /// A contact the projectile is already leaving (`v·n >= 0`) is ignored so
    /// a body resting against a wall does not bounce twice.
    pub fn update(&mut self, dt: f32, grid: &TileGrid) -> Option<Bounce> {
        self.body.integrate(dt);

        let hit = resolve(self.body.pos, self.radius, grid)?;
        let v = self.body.vel.truncate();
        if v.dot(hit.normal) >= 0.0 {
            return None;
        }

        let reflected = reflect_velocity(v, hit.normal) * self.bounciness;
        self.body.vel.x = reflected.x;
        self.body.vel.y = reflected.y;

        let push = hit.normal * (self.radius + PUSH_OUT_EPSILON);
        self.body.pos.x += push.x;
        self.body.pos.y += push.y;

        log::trace!(
            "Projectile bounced off tile ({}, {}) normal={:?}",
            hit.tile_x,
            hit.tile_y,
            hit.normal
        );

        Some(Bounce {
            normal: hit.normal,
            tile_x: hit.tile_x,
            tile_y: hit.tile_y,
            speed: reflected.length(),
        })
    }

    /// Draw position for the renderer
    #[inline]
    pub fn screen_position(&self) -> Vec2 {
        self.body.screen_position()
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.body.pos
    }
}

/// A projectile slot that can be reused once released
#[derive(Debug, Clone)]
pub struct PooledProjectile {
    pub projectile: Projectile,
    /// Seconds left before the projectile expires
    pub life: f32,
    /// Actor that fired it (never hit by its own shot)
    pub owner: Option<u32>,
    /// Damage multiplier locked in when the shot was fired
    pub damage_mult: f32,
    /// Whether the shot was fired inside the beat window
    pub on_beat: bool,
    pub in_use: bool,
}

/// Reusable projectile storage
///
/// Released slots are recycled by the next spawn, so the pool only grows to
/// the peak number of live projectiles.
#[derive(Debug, Clone, Default)]
pub struct ProjectilePool {
    slots: Vec<PooledProjectile>,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Put a projectile into a free slot, returning the slot index
    pub fn spawn(&mut self, projectile: Projectile, life: f32, owner: Option<u32>) -> usize {
        let entry = PooledProjectile {
            projectile,
            life,
            owner,
            damage_mult: 1.0,
            on_beat: false,
            in_use: true,
        };
        match self.slots.iter().position(|s| !s.in_use) {
            Some(i) => {
                self.slots[i] = entry;
                i
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        }
    }

    /// Fire from `from` toward `to`; `None` if the points coincide
    pub fn spawn_aimed(
        &mut self,
        from: Vec3,
        to: Vec3,
        speed: f32,
        radius: f32,
        life: f32,
        owner: Option<u32>,
    ) -> Option<usize> {
        let projectile = Projectile::aimed(from, to, speed, radius)?;
        Some(self.spawn(projectile, life, owner))
    }

    pub fn release(&mut self, slot: usize) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.in_use = false;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&PooledProjectile> {
        self.slots.get(slot).filter(|s| s.in_use)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut PooledProjectile> {
        self.slots.get_mut(slot).filter(|s| s.in_use)
    }

    /// Live projectiles with their slot indices
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &PooledProjectile)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.in_use)
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = (usize, &mut PooledProjectile)> {
        self.slots.iter_mut().enumerate().filter(|(_, s)| s.in_use)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.in_use).count()
    }

    /// Total slots allocated (live + free)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
