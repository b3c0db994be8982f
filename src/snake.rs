use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::TextureHandle;
use crate::config::SKIN_LAYER_COUNT;
use crate::grid::{CellId, Grid};
use crate::input::{Direction, direction_change_is_valid};

/// Who chooses a snake's direction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Autonomous,
    Manual,
}

/// One body box of a snake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub cell: CellId,
    /// World-space center of `cell`.
    pub position: Vec3,
    /// Where the box is drawn this frame, between `position` and the cell ahead.
    pub render_position: Vec3,
    /// Skin layer, cycling through [`SKIN_LAYER_COUNT`] entries head to tail.
    pub layer: u8,
    /// Next segment toward the tail.
    pub next: Option<usize>,
}

impl Segment {
    fn new(grid: &Grid, cell: CellId, layer: u8) -> Self {
        let position = grid.center(cell);
        Self {
            cell,
            position,
            render_position: position,
            layer,
            next: None,
        }
    }

    fn settle(&mut self, grid: &Grid, cell: CellId) {
        self.cell = cell;
        self.position = grid.center(cell);
        self.render_position = self.position;
    }
}

/// A chain of segments held in an index arena, head to tail via `next`.
#[derive(Debug, Clone)]
pub struct Snake {
    segments: Vec<Segment>,
    head: usize,
    tail: usize,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    min_size: usize,
    start: CellId,
    start_direction: Direction,
    control: ControlMode,
    skin: TextureHandle,
    vacated: Option<CellId>,
}

impl Snake {
    /// Builds a snake of `min_size` segments with its head on `start`.
    #[must_use]
    pub fn new(
        grid: &Grid,
        start: CellId,
        direction: Direction,
        min_size: usize,
        control: ControlMode,
        skin: TextureHandle,
    ) -> Self {
        let mut snake = Self {
            segments: Vec::new(),
            head: 0,
            tail: 0,
            direction,
            pending_direction: direction,
            score: 0,
            min_size: min_size.max(1),
            start,
            start_direction: direction,
            control,
            skin,
            vacated: None,
        };
        snake.reset(grid);
        snake
    }

    /// Discards the chain and rebuilds it at the start cell. Score is kept.
    pub fn reset(&mut self, grid: &Grid) {
        let cells = lay_out_body(grid, self.start, self.start_direction, self.min_size);
        let last = cells.len() - 1;

        self.segments = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                let mut segment = Segment::new(grid, cell, layer_for(index));
                segment.next = (index < last).then_some(index + 1);
                segment
            })
            .collect();
        self.head = 0;
        self.tail = last;
        self.direction = self.start_direction;
        self.pending_direction = self.start_direction;
        self.vacated = None;
    }

    /// Queues `direction` for the next tick unless it reverses the applied one.
    ///
    /// Returns whether the change was accepted. Rejections are not errors.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.direction, direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Cell the head moves into on the next full tick.
    #[must_use]
    pub fn next_head_cell(&self, grid: &Grid) -> Option<CellId> {
        grid.adjacent(self.head_cell(), self.pending_direction)
    }

    /// Moves the snake a fraction `scale` of a tick.
    ///
    /// Below 1 only render positions change; at 1 the tick is committed and
    /// every segment takes over the cell of the one ahead of it.
    pub fn advance(&mut self, grid: &Grid, scale: f32) -> Option<CellId> {
        let scale = scale.clamp(0.0, 1.0);
        if scale >= 1.0 {
            return self.step(grid);
        }
        self.interpolate(grid, scale);
        None
    }

    fn interpolate(&mut self, grid: &Grid, scale: f32) {
        let order = self.chain_order();
        let head_target = self
            .next_head_cell(grid)
            .map_or(self.segments[self.head].position, |cell| grid.center(cell));

        let mut target = head_target;
        for index in order {
            let segment = &mut self.segments[index];
            let own = segment.position;
            segment.render_position = own.lerp(target, scale);
            target = own;
        }
    }

    fn step(&mut self, grid: &Grid) -> Option<CellId> {
        let Some(next_head) = self.next_head_cell(grid) else {
            tracing::warn!(
                head = ?self.head_cell(),
                "snake head has no neighbour, holding position"
            );
            return None;
        };

        self.direction = self.pending_direction;
        self.vacated = Some(self.segments[self.tail].cell);

        // Tail first so each segment still reads its leader's old cell.
        let order = self.chain_order();
        for pair in order.windows(2).rev() {
            let ahead = self.segments[pair[0]].cell;
            self.segments[pair[1]].settle(grid, ahead);
        }
        self.segments[self.head].settle(grid, next_head);

        Some(next_head)
    }

    /// Appends a segment on the cell the tail vacated in the last tick.
    ///
    /// Returns the arena index of the new segment.
    pub fn grow(&mut self, grid: &Grid) -> usize {
        let tail = self.segments[self.tail];
        let cell = self.vacated.take().unwrap_or(tail.cell);
        let layer = (tail.layer + 1) % SKIN_LAYER_COUNT;

        let index = self.segments.len();
        self.segments.push(Segment::new(grid, cell, layer));
        self.segments[self.tail].next = Some(index);
        self.tail = index;
        index
    }

    /// Arena indices from head to tail.
    #[must_use]
    pub fn chain_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.segments.len());
        let mut cursor = Some(self.head);
        while let Some(index) = cursor {
            order.push(index);
            cursor = self.segments[index].next;
        }
        order
    }

    /// Iterates over `(arena index, segment)` from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &Segment)> {
        self.chain_order()
            .into_iter()
            .map(move |index| (index, &self.segments[index]))
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    #[must_use]
    pub fn head_index(&self) -> usize {
        self.head
    }

    #[must_use]
    pub fn head_cell(&self) -> CellId {
        self.segments[self.head].cell
    }

    #[must_use]
    pub fn tail_cell(&self) -> CellId {
        self.segments[self.tail].cell
    }

    /// Cell the tail left on the last committed tick.
    #[must_use]
    pub fn vacated_cell(&self) -> Option<CellId> {
        self.vacated
    }

    #[must_use]
    pub fn occupies(&self, cell: CellId) -> bool {
        self.segments.iter().any(|segment| segment.cell == cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn award_point(&mut self) {
        self.score += 1;
    }

    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    #[must_use]
    pub fn control(&self) -> ControlMode {
        self.control
    }

    #[must_use]
    pub fn is_autonomous(&self) -> bool {
        self.control == ControlMode::Autonomous
    }

    /// Hands an autonomous snake to the keyboard for the rest of the session.
    ///
    /// Returns true only on the call that performed the switch.
    pub fn cede_to_player(&mut self) -> bool {
        match self.control {
            ControlMode::Autonomous => {
                self.control = ControlMode::Manual;
                true
            }
            ControlMode::Manual => false,
        }
    }

    #[must_use]
    pub fn skin(&self) -> TextureHandle {
        self.skin
    }
}

fn layer_for(index: usize) -> u8 {
    (index % usize::from(SKIN_LAYER_COUNT)) as u8
}

/// Picks `count` cells for a fresh body, head first.
///
/// The body runs straight back from the head; at the wall it steps onto a
/// neighbouring row or column and runs back the other way. If it gets boxed in,
/// the remaining segments stack on the last cell.
fn lay_out_body(grid: &Grid, start: CellId, direction: Direction, count: usize) -> Vec<CellId> {
    let mut cells = vec![start];
    let mut back = direction.opposite();
    let mut cursor = start;

    let free = |cells: &[CellId], candidate: Option<CellId>| {
        candidate.filter(|cell| grid.is_interior(*cell) && !cells.contains(cell))
    };

    while cells.len() < count {
        if let Some(next) = free(&cells, grid.adjacent(cursor, back)) {
            cells.push(next);
            cursor = next;
            continue;
        }

        let turn = back
            .perpendicular()
            .into_iter()
            .find_map(|side| free(&cells, grid.adjacent(cursor, side)));
        match turn {
            Some(next) => {
                cells.push(next);
                cursor = next;
                back = back.opposite();
            }
            None => {
                cells.resize(count, cursor);
            }
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{ControlMode, Snake, lay_out_body};
    use crate::assets::TextureHandle;
    use crate::grid::{CellId, Grid};
    use crate::input::Direction;

    fn grid() -> Grid {
        Grid::build(10, 10, 1.0, Vec3::ZERO).expect("grid should build")
    }

    fn snake(grid: &Grid, start: CellId, direction: Direction, size: usize) -> Snake {
        Snake::new(
            grid,
            start,
            direction,
            size,
            ControlMode::Manual,
            TextureHandle(0),
        )
    }

    fn cells(snake: &Snake) -> Vec<CellId> {
        snake.segments().map(|(_, segment)| segment.cell).collect()
    }

    #[test]
    fn body_runs_straight_back_from_the_head() {
        let grid = grid();
        let snake = snake(&grid, CellId::new(5, 5), Direction::Right, 4);

        assert_eq!(
            cells(&snake),
            vec![
                CellId::new(5, 5),
                CellId::new(4, 5),
                CellId::new(3, 5),
                CellId::new(2, 5),
            ]
        );
    }

    #[test]
    fn body_turns_at_the_wall_instead_of_entering_it() {
        let grid = grid();
        let laid = lay_out_body(&grid, CellId::new(5, 5), Direction::Left, 8);

        assert_eq!(
            laid,
            vec![
                CellId::new(5, 5),
                CellId::new(6, 5),
                CellId::new(7, 5),
                CellId::new(8, 5),
                CellId::new(9, 5),
                CellId::new(10, 5),
                CellId::new(10, 6),
                CellId::new(9, 6),
            ]
        );
        assert!(laid.iter().all(|cell| grid.is_interior(*cell)));
    }

    #[test]
    fn boxed_in_body_stacks_on_last_cell() {
        let grid = Grid::build(1, 1, 1.0, Vec3::ZERO).expect("grid should build");
        let laid = lay_out_body(&grid, CellId::new(1, 1), Direction::Up, 3);

        assert_eq!(laid, vec![CellId::new(1, 1); 3]);
    }

    #[test]
    fn one_tick_moves_head_and_frees_tail_cell() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Right, 4);

        let head = snake.advance(&grid, 1.0);

        assert_eq!(head, Some(CellId::new(6, 5)));
        assert_eq!(
            cells(&snake),
            vec![
                CellId::new(6, 5),
                CellId::new(5, 5),
                CellId::new(4, 5),
                CellId::new(3, 5),
            ]
        );
        assert_eq!(snake.vacated_cell(), Some(CellId::new(2, 5)));
        assert!(!snake.occupies(CellId::new(2, 5)));
    }

    #[test]
    fn partial_advance_only_moves_render_positions() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Right, 3);
        let before = cells(&snake);

        snake.advance(&grid, 0.5);

        assert_eq!(cells(&snake), before);
        let (_, head) = snake.segments().next().expect("snake has a head");
        assert_eq!(head.render_position, Vec3::new(5.5, 5.0, 0.0));
        let (_, tail) = snake.segments().last().expect("snake has a tail");
        assert_eq!(tail.render_position, Vec3::new(3.5, 5.0, 0.0));
    }

    #[test]
    fn zero_advance_is_idempotent() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Up, 5);
        let before = cells(&snake);

        for _ in 0..10 {
            snake.advance(&grid, 0.0);
        }

        assert_eq!(cells(&snake), before);
        assert!(
            snake
                .segments()
                .all(|(_, segment)| segment.render_position == segment.position)
        );
    }

    #[test]
    fn pending_direction_rejects_reverse() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Up, 3);

        assert!(!snake.set_pending_direction(Direction::Down));
        assert_eq!(snake.pending_direction(), Direction::Up);

        assert!(snake.set_pending_direction(Direction::Left));
        snake.advance(&grid, 1.0);

        assert_eq!(snake.direction(), Direction::Left);
        assert_eq!(snake.head_cell(), CellId::new(4, 5));
    }

    #[test]
    fn reverse_is_judged_against_applied_direction_not_pending() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Up, 3);

        assert!(snake.set_pending_direction(Direction::Left));
        // Down still reverses the applied Up.
        assert!(!snake.set_pending_direction(Direction::Down));
        // Right reverses the queued Left but not the applied Up; last input wins.
        assert!(snake.set_pending_direction(Direction::Right));

        snake.advance(&grid, 1.0);
        assert_eq!(snake.head_cell(), CellId::new(6, 5));
    }

    #[test]
    fn growth_fills_vacated_cell_and_cycles_layers() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Right, 8);
        let old_tail_layer = snake.segments().last().map(|(_, s)| s.layer);
        assert_eq!(old_tail_layer, Some(7));

        snake.advance(&grid, 1.0);
        let vacated = snake.vacated_cell().expect("tick vacates the tail cell");
        let index = snake.grow(&grid);

        assert_eq!(snake.len(), 9);
        let grown = snake.segment(index).expect("grown segment exists");
        assert_eq!(grown.cell, vacated);
        assert_eq!(grown.layer, 0);
        assert_eq!(snake.tail_cell(), vacated);
    }

    #[test]
    fn reset_restores_start_layout_and_keeps_score() {
        let grid = grid();
        let mut snake = snake(&grid, CellId::new(5, 5), Direction::Right, 3);
        let start = cells(&snake);

        snake.award_point();
        snake.set_pending_direction(Direction::Up);
        snake.advance(&grid, 1.0);
        snake.grow(&grid);
        snake.reset(&grid);

        assert_eq!(cells(&snake), start);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.score(), 1);
    }

    #[test]
    fn cede_to_player_is_one_way() {
        let grid = grid();
        let mut snake = Snake::new(
            &grid,
            CellId::new(5, 5),
            Direction::Up,
            2,
            ControlMode::Autonomous,
            TextureHandle(1),
        );

        assert!(snake.is_autonomous());
        assert!(snake.cede_to_player());
        assert!(!snake.cede_to_player());
        assert_eq!(snake.control(), ControlMode::Manual);
    }
}
