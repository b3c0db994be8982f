use crate::grid::{CellId, Grid};
use crate::input::Direction;
use crate::snake::Snake;

/// Greedy single-step heading from the head toward `food`.
///
/// Picks the axis with the larger distance (vertical on ties) and moves along
/// it. Returns `None` when the head already sits on the food. Walls and bodies
/// are not considered.
#[must_use]
pub fn desired_direction(grid: &Grid, head: CellId, food: CellId) -> Option<Direction> {
    let delta = grid.center(food) - grid.center(head);

    if delta.x.abs() > delta.y.abs() {
        Some(if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else if delta.y != 0.0 {
        Some(if delta.y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        })
    } else {
        None
    }
}

/// Steers an autonomous snake toward the tracked food through the same
/// reversal guard as keyboard input. Returns whether a new heading was queued.
pub fn steer(snake: &mut Snake, grid: &Grid, food_vision: Option<CellId>) -> bool {
    let Some(food) = food_vision else {
        return false;
    };
    let Some(direction) = desired_direction(grid, snake.head_cell(), food) else {
        return false;
    };
    snake.set_pending_direction(direction)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{desired_direction, steer};
    use crate::assets::TextureHandle;
    use crate::grid::{CellId, Grid};
    use crate::input::Direction;
    use crate::snake::{ControlMode, Snake};

    fn grid() -> Grid {
        Grid::build(10, 10, 1.0, Vec3::ZERO).expect("grid should build")
    }

    #[test]
    fn dominant_axis_wins() {
        let grid = grid();
        let head = CellId::new(5, 5);

        assert_eq!(
            desired_direction(&grid, head, CellId::new(9, 6)),
            Some(Direction::Right)
        );
        assert_eq!(
            desired_direction(&grid, head, CellId::new(1, 4)),
            Some(Direction::Left)
        );
        assert_eq!(
            desired_direction(&grid, head, CellId::new(6, 9)),
            Some(Direction::Up)
        );
        assert_eq!(
            desired_direction(&grid, head, CellId::new(5, 1)),
            Some(Direction::Down)
        );
    }

    #[test]
    fn ties_go_vertical() {
        let grid = grid();

        assert_eq!(
            desired_direction(&grid, CellId::new(5, 5), CellId::new(7, 7)),
            Some(Direction::Up)
        );
    }

    #[test]
    fn no_heading_when_on_food() {
        let grid = grid();

        assert_eq!(
            desired_direction(&grid, CellId::new(5, 5), CellId::new(5, 5)),
            None
        );
    }

    #[test]
    fn steering_respects_reversal_guard() {
        let grid = grid();
        let mut snake = Snake::new(
            &grid,
            CellId::new(5, 5),
            Direction::Right,
            3,
            ControlMode::Autonomous,
            TextureHandle(0),
        );

        // Food straight behind: Left would reverse Right, so nothing changes.
        assert!(!steer(&mut snake, &grid, Some(CellId::new(1, 5))));
        assert_eq!(snake.pending_direction(), Direction::Right);

        assert!(steer(&mut snake, &grid, Some(CellId::new(5, 9))));
        assert_eq!(snake.pending_direction(), Direction::Up);
    }

    #[test]
    fn steering_without_food_keeps_heading() {
        let grid = grid();
        let mut snake = Snake::new(
            &grid,
            CellId::new(5, 5),
            Direction::Down,
            3,
            ControlMode::Autonomous,
            TextureHandle(0),
        );

        assert!(!steer(&mut snake, &grid, None));
        assert_eq!(snake.pending_direction(), Direction::Down);
    }
}
