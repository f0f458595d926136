//! Per-entity kinematic state and integrator
//!
//! Each body is owned by exactly one system per tick (player controller, an AI
//! instance or a projectile) and integrated through `&mut self`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Position, velocity and accumulated acceleration of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// `x, y` planar position, `z` height above the floor
    pub pos: Vec3,
    pub vel: Vec3,
    /// Acceleration accumulated this tick; cleared by [`Kinematics::integrate`]
    pub accel: Vec3,
    pub mass: f32,
    /// Downward pull applied to `z` each tick, scaled by mass (0 = no gravity)
    pub gravity_scale: f32,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            accel: Vec3::ZERO,
            mass: 1.0,
            gravity_scale: 0.0,
        }
    }
}

impl Kinematics {
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_gravity(mut self, gravity_scale: f32, mass: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self.mass = mass;
        self
    }

    /// Add acceleration for this tick only
    #[inline]
    pub fn accelerate(&mut self, accel: Vec3) {
        self.accel += accel;
    }

    /// Semi-implicit Euler step: velocity first, then position.
    ///
    /// Acceleration is consumed and reset, so continuous forces must be
    /// re-applied every tick. `dt = 0` freezes motion but still clears it.
    pub fn integrate(&mut self, dt: f32) {
        if self.gravity_scale != 0.0 {
            self.accel.z -= self.gravity_scale * self.mass;
        }

        self.vel += self.accel * dt;
        self.pos += self.vel * dt;
        self.accel = Vec3::ZERO;
    }

    /// Planar speed
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.truncate().length()
    }

    /// Where a renderer should draw the entity: height lifts it up the screen
    #[inline]
    pub fn screen_position(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.pos.z)
    }
}
