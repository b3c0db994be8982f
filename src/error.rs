use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Grid construction failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u16, height: u16 },
    #[error("grid dimensions {width}x{height} exceed the {max} cell limit")]
    TooLarge { width: u16, height: u16, max: u16 },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
}

/// Texture load failures. Terminal for the affected texture only.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read texture {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse texture {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("texture {0} has no layers")]
    Empty(String),
    #[error("unknown builtin texture {0}")]
    UnknownBuiltin(String),
}

/// Mesh upload failures reported by a renderer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("mesh has no vertices")]
    EmptyMesh,
    #[error("mesh index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u16, vertices: usize },
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for game setup and the binary driver.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}
