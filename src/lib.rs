//! Beat Crawler - deterministic simulation core for a tile-based rhythm action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, collision, movement, projectiles, beat clock)
//! - `config`: Data-driven tuning and zone layouts
//! - `summary`: End-of-run rhythm statistics

pub mod config;
pub mod error;
pub mod sim;
pub mod summary;

pub use config::{RhythmConfig, SimConfig, ZoneConfig};
pub use error::{ConfigError, GridError};
pub use summary::RunSummary;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the render callback)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World units per tile edge
    pub const DEFAULT_TILE_SIZE: f32 = 48.0;
    /// Obstruction height of a `#` wall tile
    pub const WALL_HEIGHT: f32 = 96.0;

    /// Extra distance a bounced projectile is pushed past its radius
    pub const PUSH_OUT_EPSILON: f32 = 0.5;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 220.0;
    pub const PLAYER_RADIUS: f32 = 10.0;
    pub const DASH_SPEED: f32 = 900.0;
    pub const DASH_SECONDS: f32 = 0.12;

    /// Player shot defaults
    pub const PLAYER_SHOT_RADIUS: f32 = 4.0;
    pub const PLAYER_SHOT_SPEED: f32 = 420.0;
    pub const PLAYER_SHOT_LIFE: f32 = 1.0;

    /// Enemy shot defaults
    pub const ENEMY_SHOT_RADIUS: f32 = 5.0;
    pub const ENEMY_SHOT_SPEED: f32 = 320.0;
    pub const ENEMY_SHOT_LIFE: f32 = 1.2;

    /// Freeze-frame after a hit (seconds)
    pub const HIT_STOP_SECONDS: f32 = 0.06;

    /// Rhythm defaults
    pub const DEFAULT_BPM: f64 = 120.0;
    pub const DEFAULT_WINDOW_SECONDS: f64 = 0.12;
    pub const DEFAULT_ON_BEAT_DAMAGE_MULT: f32 = 2.0;
    pub const DEFAULT_PULSE_DECAY: f32 = 6.0;
}

/// Distance between two world positions, ignoring vertical offset
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}
