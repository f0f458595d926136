//! Zone state and the per-tick update
//!
//! A zone owns everything that lives for one level: the tile grid, the beat
//! clock, the actor arena and the projectile pool. Each actor's body is
//! mutated by exactly one step of [`Zone::tick`]; other code reads actors
//! through their [`ActorId`] handle.
//!
//! Combat outcomes (health, death, respawn) are left to the caller: the zone
//! only reports hits through [`SimEvent`].

use glam::{Vec2, Vec3};

use super::body::Kinematics;
use super::grid::{TileGrid, WorldRect};
use super::mover::{dash, intent_velocity, move_with_collision};
use super::projectile::{Bounce, ProjectilePool};
use super::rhythm::{BeatClock, BeatEdge};
use crate::config::{DoorConfig, SimConfig, ZoneConfig};
use crate::consts::{DASH_SECONDS, DASH_SPEED};
use crate::error::ConfigError;
use crate::planar_distance;

/// Handle into a zone's actor arena
pub type ActorId = u32;

/// Who controls an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy,
    Npc,
}

impl ActorKind {
    /// Whether a shot fired by `self` can hit an actor of kind `target`.
    ///
    /// Player shots only hit enemies and enemy shots only hit the player.
    /// NPCs neither shoot anyone nor get shot.
    pub fn can_hit(self, target: ActorKind) -> bool {
        matches!(
            (self, target),
            (ActorKind::Player, ActorKind::Enemy) | (ActorKind::Enemy, ActorKind::Player)
        )
    }
}

/// A walking entity (player, enemy, NPC)
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub body: Kinematics,
    pub radius: f32,
    /// Planar velocity the controlling system wants this tick
    pub desired: Vec2,
    /// Dead actors neither move nor get hit
    pub alive: bool,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Beat(BeatEdge),
    Bounce {
        slot: usize,
        bounce: Bounce,
    },
    Hit {
        slot: usize,
        target: ActorId,
        owner: Option<ActorId>,
        on_beat: bool,
        damage_mult: f32,
    },
    /// A projectile ran out of life without hitting anything
    Expired { slot: usize },
    /// The player is standing in a door
    DoorReached { to: String },
}

/// Player intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Raw movement direction (need not be normalized)
    pub move_dir: Vec2,
    /// Fire a projectile toward this world point
    pub fire_at: Option<Vec2>,
    /// Dash in this direction
    pub dash: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct ShotTuning {
    radius: f32,
    speed: f32,
    life: f32,
}

/// Values copied out of [`SimConfig`] that the tick needs
#[derive(Debug, Clone)]
struct Tuning {
    player_speed: f32,
    player_shot: ShotTuning,
    enemy_shot: ShotTuning,
    hit_stop_seconds: f32,
}

impl From<&SimConfig> for Tuning {
    fn from(config: &SimConfig) -> Self {
        Self {
            player_speed: config.player_speed,
            player_shot: ShotTuning {
                radius: config.player_shot_radius,
                speed: config.player_shot_speed,
                life: config.player_shot_life,
            },
            enemy_shot: ShotTuning {
                radius: config.enemy_shot_radius,
                speed: config.enemy_shot_speed,
                life: config.enemy_shot_life,
            },
            hit_stop_seconds: config.hit_stop_seconds,
        }
    }
}

/// All simulation state for one zone
#[derive(Debug)]
pub struct Zone {
    id: String,
    grid: TileGrid,
    clock: BeatClock,
    /// Indexed by `ActorId`
    actors: Vec<Actor>,
    projectiles: ProjectilePool,
    player: ActorId,
    door: Option<(WorldRect, DoorConfig)>,
    tuning: Tuning,
    /// Remaining freeze-frame time
    hit_stop: f32,
    time_ticks: u64,
    events: Vec<SimEvent>,
}

impl Zone {
    /// Build a zone with the player at its spawn tile and a fresh beat clock
    pub fn new(config: &SimConfig, zone: &ZoneConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, zone, BeatClock::new(&zone.rhythm))
    }

    /// Build the zone `id` from the config
    pub fn load(config: &SimConfig, id: &str) -> Result<Self, ConfigError> {
        Self::new(config, config.zone(id)?)
    }

    fn with_clock(config: &SimConfig, zone: &ZoneConfig, clock: BeatClock) -> Result<Self, ConfigError> {
        let grid = zone.build_grid()?;
        let door = zone
            .door
            .as_ref()
            .map(|door| (grid.rect_bounds(door.rect), door.clone()));

        let mut state = Self {
            id: zone.id.clone(),
            grid,
            clock,
            actors: Vec::new(),
            projectiles: ProjectilePool::new(),
            player: 0,
            door,
            tuning: Tuning::from(config),
            hit_stop: 0.0,
            time_ticks: 0,
            events: Vec::new(),
        };

        let spawn = state.grid.find_nearest_open(zone.spawn_world().x, zone.spawn_world().y);
        state.player = state.spawn_actor(ActorKind::Player, spawn, config.player_radius);

        log::info!(
            "Zone {} ready: {}x{} tiles, {} BPM",
            state.id,
            state.grid.width(),
            state.grid.height(),
            state.clock.bpm()
        );
        Ok(state)
    }

    /// Build the zone behind this zone's door.
    ///
    /// The beat clock starts over in the new zone's tempo, keeping rhythm
    /// upgrades and run statistics. The player appears at the door's spawn.
    pub fn enter_door(&self, config: &SimConfig) -> Result<Option<Zone>, ConfigError> {
        let Some((_, door)) = &self.door else {
            return Ok(None);
        };
        let next = config.zone(&door.to)?;
        let mut zone = Self::with_clock(config, next, self.clock.next_zone(&next.rhythm))?;

        let (sx, sy) = door.spawn;
        let spawn = zone.grid.tile_center(sx as i32, sy as i32);
        let spawn = zone.grid.find_nearest_open(spawn.x, spawn.y);
        if let Some(player) = zone.actor_mut(zone.player) {
            player.body.pos = spawn.extend(0.0);
        }
        Ok(Some(zone))
    }

    /// Start the beat clock; call once when the zone becomes active
    pub fn start(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
    }

    /// Add an actor at a world position
    pub fn spawn_actor(&mut self, kind: ActorKind, pos: Vec2, radius: f32) -> ActorId {
        let id = self.actors.len() as ActorId;
        self.actors.push(Actor {
            id,
            kind,
            body: Kinematics::at(pos.extend(0.0)),
            radius,
            desired: Vec2::ZERO,
            alive: true,
        });
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id as usize)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id as usize)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Set the velocity an AI-controlled actor will move with next tick
    pub fn set_desired(&mut self, id: ActorId, velocity: Vec2) {
        if let Some(actor) = self.actor_mut(id) {
            actor.desired = velocity;
        }
    }

    #[inline]
    pub fn player(&self) -> ActorId {
        self.player
    }

    pub fn player_pos(&self) -> Vec3 {
        self.actors[self.player as usize].body.pos
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    /// Mutable clock access for rhythm upgrades
    #[inline]
    pub fn clock_mut(&mut self) -> &mut BeatClock {
        &mut self.clock
    }

    #[inline]
    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    #[inline]
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    #[inline]
    pub fn is_hit_stopped(&self) -> bool {
        self.hit_stop > 0.0
    }

    /// Fire a projectile from an actor toward `target`.
    ///
    /// Player shots use the player shot tuning, are scored against the beat
    /// and carry the on-beat damage multiplier; everyone else fires enemy
    /// shots. Returns the pool slot, or `None` if the actor does not exist,
    /// is dead, or is standing on the target.
    pub fn fire(&mut self, owner: ActorId, target: Vec2, now_ms: f64) -> Option<usize> {
        let actor = self.actor(owner).filter(|a| a.alive)?;
        let from = actor.body.pos;
        let is_player = actor.kind == ActorKind::Player;
        let shot = if is_player {
            self.tuning.player_shot
        } else {
            self.tuning.enemy_shot
        };

        let slot =
            self.projectiles
                .spawn_aimed(from, target.extend(0.0), shot.speed, shot.radius, shot.life, Some(owner))?;

        if is_player {
            let on_beat = self.clock.is_on_beat(now_ms);
            let mult = self.clock.register_shot(now_ms);
            if let Some(entry) = self.projectiles.get_mut(slot) {
                entry.on_beat = on_beat;
                entry.damage_mult = mult;
            }
        }
        Some(slot)
    }

    /// Advance the zone by `dt` seconds, ending at wall-clock time `now_ms`.
    ///
    /// While a hit-stop is running the world is frozen by stepping with
    /// `dt = 0`, so every system still runs and acceleration is still reset.
    pub fn tick(&mut self, input: &TickInput, now_ms: f64, dt: f32) -> &[SimEvent] {
        self.events.clear();

        if self.hit_stop > 0.0 {
            self.hit_stop = (self.hit_stop - dt).max(0.0);
        }
        let dt = if self.hit_stop > 0.0 { 0.0 } else { dt };

        if let Some(edge) = self.clock.tick(now_ms, dt) {
            self.events.push(SimEvent::Beat(edge));
        }

        self.update_player(input, now_ms);
        self.update_actors(dt);
        self.update_projectiles(dt);

        if let Some((rect, door)) = &self.door {
            if rect.contains(self.player_pos().truncate()) {
                self.events.push(SimEvent::DoorReached { to: door.to.clone() });
            }
        }

        self.time_ticks += 1;
        &self.events
    }

    /// Apply player intents; the move itself happens with the other actors
    fn update_player(&mut self, input: &TickInput, now_ms: f64) {
        let speed = self.tuning.player_speed;
        let player = &mut self.actors[self.player as usize];
        if !player.alive {
            return;
        }

        player.desired = intent_velocity(input.move_dir, speed).truncate();
        if let Some(dir) = input.dash {
            dash(&mut player.body.pos, dir, DASH_SPEED, DASH_SECONDS, player.radius, &self.grid);
        }

        if let Some(target) = input.fire_at {
            self.fire(self.player, target, now_ms);
        }
    }

    fn update_actors(&mut self, dt: f32) {
        for actor in self.actors.iter_mut().filter(|a| a.alive) {
            actor.body.vel = actor.desired.extend(actor.body.vel.z);
            move_with_collision(&mut actor.body.pos, &mut actor.body.vel, dt, actor.radius, &self.grid);
            actor.body.accel = Vec3::ZERO;
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        for (slot, entry) in self.projectiles.iter_live_mut() {
            if let Some(bounce) = entry.projectile.update(dt, &self.grid) {
                self.events.push(SimEvent::Bounce { slot, bounce });
            }
            entry.life -= dt;

            let pos = entry.projectile.pos();
            let radius = entry.projectile.radius;
            // Unowned shots (hazards) hit either side
            let shooter = entry.owner.and_then(|id| self.actors.get(id as usize)).map(|a| a.kind);
            let target = self.actors.iter().find(|a| {
                let hostile = match shooter {
                    Some(kind) => kind.can_hit(a.kind),
                    None => a.kind != ActorKind::Npc,
                };
                a.alive && hostile && planar_distance(pos, a.body.pos) <= a.radius + radius
            });

            if let Some(target) = target {
                log::debug!("Projectile {slot} hit actor {} (x{})", target.id, entry.damage_mult);
                self.events.push(SimEvent::Hit {
                    slot,
                    target: target.id,
                    owner: entry.owner,
                    on_beat: entry.on_beat,
                    damage_mult: entry.damage_mult,
                });
                self.hit_stop = self.tuning.hit_stop_seconds;
                entry.in_use = false;
                continue;
            }

            if entry.life <= 0.0 {
                self.events.push(SimEvent::Expired { slot });
                entry.in_use = false;
            }
        }
    }
}
