use glam::Vec3;
use rand::Rng;

use crate::config::FOOD_COLOR;
use crate::grid::{CellId, Grid};

/// The food item currently on the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Food {
    pub cell: CellId,
    pub position: Vec3,
    pub color: [u8; 3],
}

impl Food {
    /// Creates food on `cell`.
    #[must_use]
    pub fn new(grid: &Grid, cell: CellId) -> Self {
        Self {
            cell,
            position: grid.center(cell),
            color: FOOD_COLOR,
        }
    }

    /// Spawns food on a uniformly random interior cell.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, grid: &Grid) -> Self {
        Self::new(grid, spawn_cell(rng, grid))
    }
}

/// Picks a uniformly random interior cell.
///
/// Occupancy is not checked: food may land under a snake.
#[must_use]
pub fn spawn_cell<R: Rng + ?Sized>(rng: &mut R, grid: &Grid) -> CellId {
    CellId::new(
        rng.gen_range(1..=grid.width()),
        rng.gen_range(1..=grid.height()),
    )
}

/// Like [`spawn_cell`], but re-rolls while the roll equals `excluded`.
///
/// A single-cell interior has no alternative and returns that cell.
#[must_use]
pub fn spawn_cell_excluding<R: Rng + ?Sized>(rng: &mut R, grid: &Grid, excluded: CellId) -> CellId {
    if grid.width() == 1 && grid.height() == 1 {
        return spawn_cell(rng, grid);
    }

    loop {
        let cell = spawn_cell(rng, grid);
        if cell != excluded {
            return cell;
        }
    }
}
