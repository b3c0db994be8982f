//! Grid snake game: one player snake and one greedy autonomous rival on a
//! walled lattice, simulated in fixed ticks and drawn through a pluggable
//! renderer.

pub mod ai;
pub mod assets;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod registry;
pub mod render;
pub mod session;
pub mod snake;
pub mod ui;
