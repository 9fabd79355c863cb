use std::io;

use thiserror::Error;

/// Errors raised while building a tile map from a layout or a map file.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map layout is empty")]
    EmptyLayout,

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("tile size must be positive, got {width}x{height}")]
    ZeroTileSize { width: i32, height: i32 },

    #[error("map of {cols}x{rows} tiles is too large")]
    TooLarge { cols: i32, rows: i32 },

    #[error("layer '{layer}' holds {found} tiles, expected {expected}")]
    LayerSize {
        layer: String,
        expected: usize,
        found: usize,
    },

    #[error("failed to parse map file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read map file: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while reading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors raised while wiring movement components.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("a world is already attached to this movement component")]
    WorldAlreadyAttached,
}
