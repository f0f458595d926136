//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Wall-clock time is passed in explicitly, never read
//! - Stable iteration order (row-major tiles, actors by ID, projectiles by slot)
//! - No rendering, audio, or platform dependencies

pub mod body;
pub mod collision;
pub mod grid;
pub mod mover;
pub mod projectile;
pub mod rhythm;
pub mod step;
pub mod zone;

pub use body::Kinematics;
pub use collision::{Contact, is_blocked, reflect_velocity, resolve};
pub use grid::{TileDef, TileGrid, TileRect, WorldRect};
pub use mover::{dash, intent_velocity, move_with_collision};
pub use projectile::{Bounce, PooledProjectile, Projectile, ProjectilePool};
pub use rhythm::{BeatClock, BeatEdge, ClockState};
pub use step::FixedStep;
pub use zone::{Actor, ActorId, ActorKind, SimEvent, TickInput, Zone};
