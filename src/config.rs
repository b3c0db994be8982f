use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::grid::{CellId, MAX_DIMENSION};
use crate::input::Direction;
use crate::snake::ControlMode;

/// Default interior grid width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 24;

/// Default interior grid height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 16;

/// Default world-space edge length of one cell.
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Fixed simulation tick in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 150;

/// Segments a snake is (re)built with.
pub const DEFAULT_MIN_SNAKE_SIZE: usize = 8;

/// Number of texture layers in a snake skin; segment layers cycle through them.
pub const SKIN_LAYER_COUNT: u8 = 8;

/// How long the frame loop waits for keyboard input.
pub const FRAME_POLL_INTERVAL_MS: u64 = 16;

/// Texture used for walls and floor tiles.
pub const DEFAULT_ITEM_SKIN_URL: &str = "builtin:item";

/// Flat colour of food.
pub const FOOD_COLOR: [u8; 3] = [230, 40, 40];

/// Start parameters for one snake.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnakeConfig {
    pub start: CellId,
    pub direction: Direction,
    #[serde(default = "default_control")]
    pub control: ControlMode,
    #[serde(default = "default_snake_skin")]
    pub skin: String,
}

fn default_control() -> ControlMode {
    ControlMode::Manual
}

fn default_snake_skin() -> String {
    "builtin:snake".to_owned()
}

/// All tunables of one game session.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    pub cell_size: f32,
    pub origin: [f32; 3],
    pub tick_ms: u64,
    pub min_snake_size: usize,
    pub seed: Option<u64>,
    pub item_skin: String,
    /// Snakes in registration order. The first is steered with the arrow
    /// keys, the second with W/A/S/D.
    pub snakes: Vec<SnakeConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            origin: [0.0, 0.0, 0.0],
            tick_ms: DEFAULT_TICK_INTERVAL_MS,
            min_snake_size: DEFAULT_MIN_SNAKE_SIZE,
            seed: None,
            item_skin: DEFAULT_ITEM_SKIN_URL.to_owned(),
            snakes: vec![
                SnakeConfig {
                    start: CellId::new(DEFAULT_GRID_WIDTH / 4, DEFAULT_GRID_HEIGHT / 3),
                    direction: Direction::Right,
                    control: ControlMode::Manual,
                    skin: default_snake_skin(),
                },
                SnakeConfig {
                    start: CellId::new(DEFAULT_GRID_WIDTH * 3 / 4, DEFAULT_GRID_HEIGHT * 2 / 3),
                    direction: Direction::Left,
                    control: ControlMode::Autonomous,
                    skin: "builtin:rival".to_owned(),
                },
            ],
        }
    }
}

impl GameConfig {
    /// Reads a JSON config file and validates it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".to_owned()));
        }
        if self.min_snake_size == 0 {
            return Err(ConfigError::Invalid(
                "min_snake_size must be positive".to_owned(),
            ));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid(
                "grid_width and grid_height must be positive".to_owned(),
            ));
        }
        if self.grid_width > MAX_DIMENSION || self.grid_height > MAX_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "grid {}x{} exceeds the {MAX_DIMENSION} cell limit",
                self.grid_width, self.grid_height
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "cell_size must be a positive finite number".to_owned(),
            ));
        }
        if self.snakes.is_empty() {
            return Err(ConfigError::Invalid("at least one snake is required".to_owned()));
        }

        for (index, snake) in self.snakes.iter().enumerate() {
            let CellId { col, row } = snake.start;
            let inside =
                (1..=self.grid_width).contains(&col) && (1..=self.grid_height).contains(&row);
            if !inside {
                return Err(ConfigError::Invalid(format!(
                    "snake {index} starts at ({col}, {row}), outside the {}x{} interior",
                    self.grid_width, self.grid_height
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[must_use]
    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }
}
