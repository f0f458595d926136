//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails: collision, movement, integration and
//! beat queries return neutral values for degenerate input. Errors only come
//! from building a grid or loading configuration.

/// Invalid tile grid description
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid is {width}x{height} ({expected} cells) but {actual} cells were given")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tile ({tile_x}, {tile_y}) references type {index}, which is not in the tile table")]
    UnknownTileType {
        index: u16,
        tile_x: usize,
        tile_y: usize,
    },

    #[error("tile table is empty")]
    EmptyTable,

    #[error("grid has no cells")]
    EmptyGrid,

    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),

    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Configuration could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no zone named {0:?}")]
    UnknownZone(String),

    #[error("zone layout is invalid: {0}")]
    Grid(#[from] GridError),
}
