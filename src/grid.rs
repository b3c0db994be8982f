use glam::Vec3;

use crate::error::GridError;
use crate::input::Direction;

/// Lattice coordinate of a cell. Column 0 and row 0 are part of the wall ring.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CellId {
    pub col: u16,
    pub row: u16,
}

impl CellId {
    #[must_use]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

/// One lattice position with a fixed world-space center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub center: Vec3,
    up: Option<CellId>,
    down: Option<CellId>,
    left: Option<CellId>,
    right: Option<CellId>,
}

impl Cell {
    /// Neighbour in `direction`. Always `None` for wall-ring cells.
    #[must_use]
    pub fn adjacent(&self, direction: Direction) -> Option<CellId> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Neighbour on the far side from `direction`.
    #[must_use]
    pub fn opposite(&self, direction: Direction) -> Option<CellId> {
        self.adjacent(direction.opposite())
    }
}

/// Fixed (width+2)×(height+2) lattice; the outer ring is reserved for walls.
///
/// Cells are stored row-major and never change after [`Grid::build`].
#[derive(Debug, Clone)]
pub struct Grid {
    width: u16,
    height: u16,
    cell_size: f32,
    origin: Vec3,
    cells: Vec<Cell>,
}

/// Largest interior width or height [`Grid::build`] accepts.
pub const MAX_DIMENSION: u16 = 4096;

impl Grid {
    /// Builds the lattice and wires neighbour links for interior cells.
    pub fn build(width: u16, height: u16, cell_size: f32, origin: Vec3) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(GridError::TooLarge {
                width,
                height,
                max: MAX_DIMENSION,
            });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let cols = width + 2;
        let rows = height + 2;
        let mut cells = Vec::with_capacity(usize::from(cols) * usize::from(rows));

        for row in 0..rows {
            for col in 0..cols {
                let id = CellId::new(col, row);
                let center = origin + Vec3::new(f32::from(col), f32::from(row), 0.0) * cell_size;
                let interior = col >= 1 && col <= width && row >= 1 && row <= height;
                let link = |direction: Direction| {
                    interior.then(|| {
                        // Interior cells always have a neighbour, possibly a wall cell.
                        let (dc, dr) = direction.delta();
                        CellId::new(
                            (i32::from(col) + dc) as u16,
                            (i32::from(row) + dr) as u16,
                        )
                    })
                };

                cells.push(Cell {
                    id,
                    center,
                    up: link(Direction::Up),
                    down: link(Direction::Down),
                    left: link(Direction::Left),
                    right: link(Direction::Right),
                });
            }
        }

        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            cells,
        })
    }

    /// Interior width in cells.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Interior height in cells.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of columns including the wall ring.
    #[must_use]
    pub fn columns(&self) -> u16 {
        self.width + 2
    }

    /// Number of rows including the wall ring.
    #[must_use]
    pub fn rows(&self) -> u16 {
        self.height + 2
    }

    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        id.col < self.columns() && id.row < self.rows()
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        if !self.contains(id) {
            return None;
        }
        self.cells
            .get(usize::from(id.row) * usize::from(self.columns()) + usize::from(id.col))
    }

    /// World-space center of `id`, computed directly for ids outside the lattice.
    #[must_use]
    pub fn center(&self, id: CellId) -> Vec3 {
        if let Some(cell) = self.cell(id) {
            return cell.center;
        }
        let offset = Vec3::new(f32::from(id.col), f32::from(id.row), 0.0);
        self.origin + offset * self.cell_size
    }

    #[must_use]
    pub fn adjacent(&self, id: CellId, direction: Direction) -> Option<CellId> {
        self.cell(id)?.adjacent(direction)
    }

    #[must_use]
    pub fn opposite(&self, id: CellId, direction: Direction) -> Option<CellId> {
        self.cell(id)?.opposite(direction)
    }

    #[must_use]
    pub fn is_interior(&self, id: CellId) -> bool {
        id.col >= 1 && id.col <= self.width && id.row >= 1 && id.row <= self.height
    }

    #[must_use]
    pub fn is_border(&self, id: CellId) -> bool {
        self.contains(id) && !self.is_interior(id)
    }

    pub fn interior_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .map(|cell| cell.id)
            .filter(|id| self.is_interior(*id))
    }

    pub fn border_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .map(|cell| cell.id)
            .filter(|id| self.is_border(*id))
    }

    /// World-space corners of the whole lattice including the wall ring,
    /// padded by half a cell so every cell lies fully inside.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = Vec3::splat(self.cell_size / 2.0);
        let far = CellId::new(self.columns() - 1, self.rows() - 1);
        (self.origin - half, self.center(far) + half)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{CellId, Grid, MAX_DIMENSION};
    use crate::error::GridError;
    use crate::input::Direction;

    fn grid() -> Grid {
        Grid::build(10, 8, 2.0, Vec3::new(1.0, -1.0, 0.0)).expect("grid should build")
    }

    #[test]
    fn lattice_includes_wall_ring() {
        let grid = grid();

        assert_eq!(grid.columns(), 12);
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.interior_cells().count(), 80);
        assert_eq!(grid.border_cells().count(), 12 * 10 - 80);
    }

    #[test]
    fn centers_follow_origin_and_cell_size() {
        let grid = grid();

        assert_eq!(grid.center(CellId::new(0, 0)), Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(grid.center(CellId::new(3, 2)), Vec3::new(7.0, 3.0, 0.0));
    }

    #[test]
    fn interior_cells_link_to_all_four_neighbours() {
        let grid = grid();
        let id = CellId::new(1, 1);

        assert_eq!(grid.adjacent(id, Direction::Up), Some(CellId::new(1, 2)));
        assert_eq!(grid.adjacent(id, Direction::Down), Some(CellId::new(1, 0)));
        assert_eq!(grid.adjacent(id, Direction::Left), Some(CellId::new(0, 1)));
        assert_eq!(grid.adjacent(id, Direction::Right), Some(CellId::new(2, 1)));
        assert_eq!(grid.opposite(id, Direction::Right), Some(CellId::new(0, 1)));
    }

    #[test]
    fn links_are_bidirectional_between_interior_cells() {
        let grid = grid();
        for id in grid.interior_cells() {
            for direction in Direction::ALL {
                let Some(next) = grid.adjacent(id, direction) else {
                    panic!("interior cell {id:?} missing {direction:?} link");
                };
                if grid.is_interior(next) {
                    assert_eq!(grid.opposite(next, direction), Some(id));
                }
            }
        }
    }

    #[test]
    fn border_cells_have_no_links() {
        let grid = grid();
        for id in grid.border_cells() {
            for direction in Direction::ALL {
                assert_eq!(grid.adjacent(id, direction), None);
            }
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            Grid::build(0, 5, 1.0, Vec3::ZERO).unwrap_err(),
            GridError::EmptyDimensions {
                width: 0,
                height: 5
            }
        );
        assert!(Grid::build(5, 5, 0.0, Vec3::ZERO).is_err());
        assert!(Grid::build(5, 5, f32::NAN, Vec3::ZERO).is_err());
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(
            Grid::build(u16::MAX, 1, 1.0, Vec3::ZERO).unwrap_err(),
            GridError::TooLarge {
                width: u16::MAX,
                height: 1,
                max: MAX_DIMENSION
            }
        );
        assert!(Grid::build(3, MAX_DIMENSION + 1, 1.0, Vec3::ZERO).is_err());

        let grid = Grid::build(MAX_DIMENSION, 1, 1.0, Vec3::ZERO).expect("grid should build");
        assert_eq!(grid.columns(), MAX_DIMENSION + 2);
    }

    #[test]
    fn bounds_cover_wall_ring() {
        let grid = Grid::build(4, 2, 1.0, Vec3::ZERO).expect("grid should build");
        let (min, max) = grid.bounds();

        assert_eq!(min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(max, Vec3::new(5.5, 3.5, 0.5));
    }
}
