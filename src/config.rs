//! Simulation tuning and zone layouts
//!
//! Everything here is plain data with serde derives so a whole setup can be
//! loaded from one JSON file. Missing fields fall back to the defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::grid::{TileGrid, TileRect};

/// Tempo and rhythm bonus for a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    pub bpm: f64,
    /// Acceptance tolerance on each side of a beat (seconds)
    pub window_seconds: f64,
    /// Damage multiplier for shots fired on beat
    pub on_beat_damage_mult: f32,
    /// How fast the beat pulse fades (per second)
    pub pulse_decay: f32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            on_beat_damage_mult: DEFAULT_ON_BEAT_DAMAGE_MULT,
            pulse_decay: DEFAULT_PULSE_DECAY,
        }
    }
}

/// A zone: layout rows plus its rhythm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Layout rows, `#` = wall
    pub rows: Vec<String>,
    /// Player spawn tile
    pub spawn: (u32, u32),
    /// Tiles that lead to another zone
    #[serde(default)]
    pub door: Option<DoorConfig>,
    #[serde(default)]
    pub rhythm: RhythmConfig,
}

/// Exit from one zone into another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    pub to: String,
    pub rect: TileRect,
    /// Spawn tile in the destination zone
    pub spawn: (u32, u32),
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

impl ZoneConfig {
    pub fn build_grid(&self) -> Result<TileGrid, ConfigError> {
        Ok(TileGrid::from_rows(self.tile_size, &self.rows)?)
    }

    /// World position of the spawn tile's center
    pub fn spawn_world(&self) -> Vec2 {
        let (x, y) = self.spawn;
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5) * self.tile_size
    }
}

/// Tuning for the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub player_speed: f32,
    pub player_radius: f32,
    pub player_shot_radius: f32,
    pub player_shot_speed: f32,
    /// Seconds before an unspent player shot despawns
    pub player_shot_life: f32,
    pub enemy_shot_radius: f32,
    pub enemy_shot_speed: f32,
    pub enemy_shot_life: f32,
    /// Freeze-frame length after a hit
    pub hit_stop_seconds: f32,
    pub zones: Vec<ZoneConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_RADIUS,
            player_shot_radius: PLAYER_SHOT_RADIUS,
            player_shot_speed: PLAYER_SHOT_SPEED,
            player_shot_life: PLAYER_SHOT_LIFE,
            enemy_shot_radius: ENEMY_SHOT_RADIUS,
            enemy_shot_speed: ENEMY_SHOT_SPEED,
            enemy_shot_life: ENEMY_SHOT_LIFE,
            hit_stop_seconds: HIT_STOP_SECONDS,
            zones: default_zones(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {} ({} zones)", path.display(), config.zones.len());
        Ok(config)
    }

    pub fn zone(&self, id: &str) -> Result<&ZoneConfig, ConfigError> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or_else(|| ConfigError::UnknownZone(id.to_string()))
    }
}

fn rows(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// The two starting zones, linked by a door each way
fn default_zones() -> Vec<ZoneConfig> {
    vec![
        ZoneConfig {
            id: "map1".into(),
            tile_size: DEFAULT_TILE_SIZE,
            rows: rows(&[
                "####################",
                "#..................#",
                "#........#.........#",
                "#..................#",
                "#.....#............#",
                "#..................#",
                "#..................#",
                "#............#.....#",
                "#..................#",
                "#..................#",
                "#..................#",
                "####################",
            ]),
            spawn: (4, 4),
            door: Some(DoorConfig {
                to: "map2".into(),
                rect: TileRect { x: 18, y: 4, w: 1, h: 3 },
                spawn: (3, 3),
            }),
            rhythm: RhythmConfig::default(),
        },
        ZoneConfig {
            id: "map2".into(),
            tile_size: DEFAULT_TILE_SIZE,
            rows: rows(&[
                "##################",
                "#................#",
                "#................#",
                "#................#",
                "#..############..#",
                "#................#",
                "#................#",
                "#................#",
                "#................#",
                "##################",
            ]),
            spawn: (2, 5),
            door: Some(DoorConfig {
                to: "map1".into(),
                rect: TileRect { x: 1, y: 4, w: 1, h: 2 },
                spawn: (3, 5),
            }),
            rhythm: RhythmConfig {
                bpm: 96.0,
                ..RhythmConfig::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.player_speed, 220.0);
        assert_eq!(config.player_radius, 10.0);
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.zone("map1").unwrap().rhythm.bpm, 120.0);
        assert_eq!(config.zone("map2").unwrap().rhythm.bpm, 96.0);
    }

    #[test]
    fn test_default_zones_build() {
        let config = SimConfig::default();
        for zone in &config.zones {
            let grid = zone.build_grid().unwrap();
            let (sx, sy) = zone.spawn;
            assert!(grid.is_walkable(sx as i32, sy as i32), "{} spawn is in a wall", zone.id);
        }
    }

    #[test]
    fn test_default_zones_are_walled_in() {
        let config = SimConfig::default();
        for zone in &config.zones {
            let grid = zone.build_grid().unwrap();
            let (w, h) = (grid.width(), grid.height());
            for x in 0..w {
                assert!(grid.cell_at(x, 0).solid, "{} open at ({x}, 0)", zone.id);
                assert!(grid.cell_at(x, h - 1).solid, "{} open at ({x}, {})", zone.id, h - 1);
            }
            for y in 0..h {
                assert!(grid.cell_at(0, y).solid, "{} open at (0, {y})", zone.id);
                assert!(grid.cell_at(w - 1, y).solid, "{} open at ({}, {y})", zone.id, w - 1);
            }
        }
    }

    #[test]
    fn test_default_doors_link_both_ways() {
        let config = SimConfig::default();
        for zone in &config.zones {
            let grid = zone.build_grid().unwrap();
            let door = zone.door.as_ref().unwrap();
            let rect = door.rect;
            for y in rect.y..rect.y + rect.h {
                for x in rect.x..rect.x + rect.w {
                    assert!(grid.is_walkable(x as i32, y as i32), "{} door tile ({x}, {y}) is a wall", zone.id);
                }
            }

            // Arriving through the door must not land inside the return door
            let next = config.zone(&door.to).unwrap();
            let next_grid = next.build_grid().unwrap();
            let (sx, sy) = door.spawn;
            assert!(next_grid.is_walkable(sx as i32, sy as i32));
            let back = next_grid.rect_bounds(next.door.as_ref().unwrap().rect);
            assert!(!back.contains(next_grid.tile_center(sx as i32, sy as i32)));
        }
    }

    #[test]
    fn test_unknown_zone() {
        let config = SimConfig::default();
        let err = config.zone("map9").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownZone(ref id) if id == "map9"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "player_speed": 300.0 }"#).unwrap();
        assert_eq!(config.player_speed, 300.0);
        assert_eq!(config.player_shot_speed, PLAYER_SHOT_SPEED);
        assert_eq!(config.enemy_shot_speed, ENEMY_SHOT_SPEED);
        assert_eq!(config.zones.len(), 2);
    }

    #[test]
    fn test_zone_json() {
        let json = r####"{
            "zones": [
                { "id": "tiny", "rows": ["###", "#.#", "###"], "spawn": [1, 1],
                  "rhythm": { "bpm": 90.0 } }
            ]
        }"####;
        let config = SimConfig::from_json_str(json).unwrap();
        let zone = config.zone("tiny").unwrap();
        assert_eq!(zone.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(zone.rhythm.bpm, 90.0);
        assert_eq!(zone.rhythm.window_seconds, DEFAULT_WINDOW_SECONDS);
        assert_eq!(zone.spawn_world(), Vec2::new(72.0, 72.0));
        assert!(zone.door.is_none());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_ragged_zone_is_grid_error() {
        let zone = ZoneConfig {
            id: "bad".into(),
            tile_size: 48.0,
            rows: rows(&["###", "#."]),
            spawn: (1, 1),
            door: None,
            rhythm: RhythmConfig::default(),
        };
        assert!(matches!(zone.build_grid(), Err(ConfigError::Grid(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SimConfig::load("/nonexistent/beat-crawler.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
