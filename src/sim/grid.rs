//! Static tile grid describing a zone's terrain
//!
//! A grid is built once when a zone loads and never mutated afterwards. Every
//! other part of the simulation only reads it, so a single `&TileGrid` can be
//! shared by all queries within a tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::WALL_HEIGHT;
use crate::error::GridError;

/// Properties of one tile type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    /// Whether the tile blocks movement
    pub solid: bool,
    /// Obstruction height; entities with `z` above it pass over the tile
    pub height: f32,
}

impl TileDef {
    pub const OPEN: Self = Self {
        solid: false,
        height: 0.0,
    };

    pub const WALL: Self = Self {
        solid: true,
        height: WALL_HEIGHT,
    };

    /// Whether this tile stops an entity at vertical offset `z`
    #[inline]
    pub fn blocks_at(&self, z: f32) -> bool {
        self.solid && z <= self.height
    }
}

/// A rectangle of tiles (tile coordinates, width/height in tiles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// A tile rectangle converted to world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldRect {
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Immutable rectangular tile map
///
/// Only serializable one way: a grid can be dumped for debugging, but is
/// always constructed through [`TileGrid::new`] so its invariants hold.
#[derive(Debug, Clone, Serialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    /// Row-major tile type indices into `defs`
    cells: Vec<u16>,
    defs: Vec<TileDef>,
}

impl TileGrid {
    /// Build a grid from explicit cells and a tile type table.
    ///
    /// Fails if the cell count does not match the dimensions or if any cell
    /// refers to a tile type missing from `defs`.
    pub fn new(
        width: usize,
        height: usize,
        tile_size: f32,
        cells: Vec<u16>,
        defs: Vec<TileDef>,
    ) -> Result<Self, GridError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(GridError::InvalidTileSize(tile_size));
        }
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        if defs.is_empty() {
            return Err(GridError::EmptyTable);
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(GridError::DimensionMismatch {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        if let Some(i) = cells.iter().position(|&c| c as usize >= defs.len()) {
            return Err(GridError::UnknownTileType {
                index: cells[i],
                tile_x: i % width,
                tile_y: i / width,
            });
        }

        Ok(Self {
            width,
            height,
            tile_size,
            cells,
            defs,
        })
    }

    /// Build a grid from text rows: `#` is a wall, anything else is open floor
    pub fn from_rows<S: AsRef<str>>(tile_size: f32, rows: &[S]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);

        let mut cells = Vec::with_capacity(width * height);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(GridError::RaggedRows {
                    row: row_index,
                    expected: width,
                    actual,
                });
            }
            cells.extend(row.chars().map(|c| if c == '#' { 1 } else { 0 }));
        }

        let grid = Self::new(width, height, tile_size, cells, vec![TileDef::OPEN, TileDef::WALL])?;
        log::info!(
            "Built {}x{} tile grid ({} solid tiles)",
            grid.width,
            grid.height,
            grid.cells.iter().filter(|&&c| c == 1).count()
        );
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Size of the whole grid in world units
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }

    #[inline]
    pub fn in_bounds(&self, tile_x: i32, tile_y: i32) -> bool {
        tile_x >= 0 && tile_y >= 0 && (tile_x as usize) < self.width && (tile_y as usize) < self.height
    }

    /// Tile definition at in-range tile coordinates.
    ///
    /// Panics on out-of-range coordinates; callers clamp first (the collision
    /// resolver always does) or use [`TileGrid::get_cell`].
    #[inline]
    pub fn cell_at(&self, tile_x: usize, tile_y: usize) -> &TileDef {
        assert!(tile_x < self.width && tile_y < self.height, "tile ({tile_x}, {tile_y}) out of range");
        &self.defs[self.cells[tile_x + tile_y * self.width] as usize]
    }

    /// Checked variant of [`TileGrid::cell_at`]
    pub fn get_cell(&self, tile_x: i32, tile_y: i32) -> Option<&TileDef> {
        if !self.in_bounds(tile_x, tile_y) {
            return None;
        }
        Some(self.cell_at(tile_x as usize, tile_y as usize))
    }

    /// Tile containing a world position (floor division by tile size)
    #[inline]
    pub fn world_to_tile(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.tile_size).floor() as i32,
            (y / self.tile_size).floor() as i32,
        )
    }

    /// World position of a tile's center
    #[inline]
    pub fn tile_center(&self, tile_x: i32, tile_y: i32) -> Vec2 {
        Vec2::new(
            tile_x as f32 * self.tile_size + self.tile_size * 0.5,
            tile_y as f32 * self.tile_size + self.tile_size * 0.5,
        )
    }

    pub fn rect_bounds(&self, rect: TileRect) -> WorldRect {
        WorldRect {
            min: Vec2::new(rect.x as f32, rect.y as f32) * self.tile_size,
            max: Vec2::new((rect.x + rect.w) as f32, (rect.y + rect.h) as f32) * self.tile_size,
        }
    }

    /// Whether a tile can be walked on; out-of-bounds tiles are not walkable
    pub fn is_walkable(&self, tile_x: i32, tile_y: i32) -> bool {
        self.get_cell(tile_x, tile_y).is_some_and(|def| !def.solid)
    }

    /// Center of the nearest walkable tile to a world position.
    ///
    /// Searches square rings outward from the containing tile. Falls back to
    /// the center of tile (1, 1) when the grid has no open tile at all.
    pub fn find_nearest_open(&self, x: f32, y: f32) -> Vec2 {
        let (tile_x, tile_y) = self.world_to_tile(x, y);
        if self.is_walkable(tile_x, tile_y) {
            return self.tile_center(tile_x, tile_y);
        }

        let max_radius = self.width.max(self.height) as i32;
        for r in 1..=max_radius {
            for dy in -r..=r {
                for dx in -r..=r {
                    // Ring only
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let (tx, ty) = (tile_x + dx, tile_y + dy);
                    if self.is_walkable(tx, ty) {
                        return self.tile_center(tx, ty);
                    }
                }
            }
        }

        Vec2::splat(self.tile_size * 1.5)
    }
}
