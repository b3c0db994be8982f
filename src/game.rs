use std::time::Duration;

use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ai;
use crate::assets::{AssetLoader, TextureHandle};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::food::{self, Food};
use crate::geometry::Mesh;
use crate::grid::{CellId, Grid};
use crate::input::{GameInput, SnakeSlot};
use crate::registry::{ObjectKind, ObjectType, Registry};
use crate::render::{DrawCall, Drawable, Renderer, Shading, board_view_projection};
use crate::snake::Snake;

/// Where the engine is within a tick. `Idle` between ticks.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickPhase {
    Idle,
    Advancing,
    CollisionCheck,
    Resolving,
}

/// A head landing on a registered object.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Collision {
    Food { snake: usize, entry: usize },
    Fatal { snake: usize, entry: usize },
}

/// Scores after they changed, for the score display.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct ScoresChanged {
    pub player: u32,
    pub auto: u32,
}

/// What happened during one [`GameState::update`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Full ticks applied; more than one when catching up on a slow frame.
    pub ticks: u32,
    /// Snakes that ate, once per tick they ate in.
    pub eaten: Vec<usize>,
    /// Snakes that died and were rebuilt, once per tick they died in.
    pub deaths: Vec<usize>,
    pub scores_changed: Option<ScoresChanged>,
}

/// Complete mutable game state for one session.
#[derive(Debug)]
pub struct GameState {
    grid: Grid,
    snakes: Vec<Snake>,
    food: Food,
    food_vision: Option<CellId>,
    registry: Registry,
    rng: StdRng,
    item_texture: TextureHandle,
    tick_interval: Duration,
    accumulated: Duration,
    tick_count: u64,
    phase: TickPhase,
}

impl GameState {
    /// Builds the board, snakes and first food, and registers every object
    /// with `backend`.
    pub fn new<B>(config: &GameConfig, backend: &mut B) -> Result<Self, GameError>
    where
        B: Renderer + AssetLoader + ?Sized,
    {
        config.validate()?;
        let grid = Grid::build(
            config.grid_width,
            config.grid_height,
            config.cell_size,
            config.origin(),
        )?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let item_texture = backend.load_texture(&config.item_skin);
        let snakes = config
            .snakes
            .iter()
            .map(|snake| {
                let skin = backend.load_texture(&snake.skin);
                Snake::new(
                    &grid,
                    snake.start,
                    snake.direction,
                    config.min_snake_size,
                    snake.control,
                    skin,
                )
            })
            .collect();
        let food = Food::spawn(&mut rng, &grid);

        let mut state = Self {
            grid,
            snakes,
            food,
            food_vision: Some(food.cell),
            registry: Registry::new(),
            rng,
            item_texture,
            tick_interval: config.tick_interval(),
            accumulated: Duration::ZERO,
            tick_count: 0,
            phase: TickPhase::Idle,
        };
        state.register_board(backend);

        tracing::info!(
            width = config.grid_width,
            height = config.grid_height,
            snakes = state.snakes.len(),
            objects = state.registry.len(),
            "game state built"
        );
        Ok(state)
    }

    fn register_board<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let land: Vec<_> = self.grid.interior_cells().collect();
        for cell in land {
            self.register(ObjectKind::Land { cell }, renderer);
        }
        let walls: Vec<_> = self.grid.border_cells().collect();
        for cell in walls {
            self.register(ObjectKind::Wall { cell }, renderer);
        }
        for snake in 0..self.snakes.len() {
            self.register_snake(snake, renderer);
        }
        self.register(
            ObjectKind::Food {
                cell: self.food.cell,
            },
            renderer,
        );
    }

    /// Advances the simulation by `dt` of real time.
    ///
    /// Whole ticks that fit into the accumulated time are applied back to
    /// back; the remainder only moves render positions.
    pub fn update<R: Renderer + ?Sized>(&mut self, dt: Duration, renderer: &mut R) -> TickReport {
        self.accumulated += dt;
        let ticks = (self.accumulated.as_nanos() / self.tick_interval.as_nanos()) as u32;
        self.accumulated -= self.tick_interval * ticks;

        let mut report = TickReport {
            ticks,
            ..TickReport::default()
        };
        for _ in 0..ticks {
            self.tick(renderer, &mut report);
        }

        let scale = self.accumulated.as_secs_f32() / self.tick_interval.as_secs_f32();
        for snake in &mut self.snakes {
            snake.advance(&self.grid, scale);
        }

        report
    }

    fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R, report: &mut TickReport) {
        self.tick_count += 1;

        self.phase = TickPhase::Advancing;
        for snake in &mut self.snakes {
            if snake.is_autonomous() {
                ai::steer(snake, &self.grid, self.food_vision);
            }
            snake.advance(&self.grid, 1.0);
        }

        self.phase = TickPhase::CollisionCheck;
        let collisions = self.find_collisions();

        self.phase = TickPhase::Resolving;
        self.resolve(&collisions, renderer, report);

        self.phase = TickPhase::Idle;
        tracing::debug!(
            tick = self.tick_count,
            collisions = collisions.len(),
            "tick applied"
        );
    }

    /// Scans the registry for every object under a snake head.
    ///
    /// A snake's own head entry is skipped; the rest of its body is not.
    #[must_use]
    pub fn find_collisions(&self) -> Vec<Collision> {
        let mut collisions = Vec::new();

        for (snake_index, snake) in self.snakes.iter().enumerate() {
            let head = snake.head_cell();
            let head_segment = snake.head_index();

            for (entry, object) in self.registry.iter() {
                let own_head = matches!(
                    object.kind,
                    ObjectKind::Segment { snake: owner, segment }
                        if owner == snake_index && segment == head_segment
                );
                if own_head || self.object_cell(object.kind) != Some(head) {
                    continue;
                }

                match object.kind.object_type() {
                    ObjectType::Food => collisions.push(Collision::Food {
                        snake: snake_index,
                        entry,
                    }),
                    ObjectType::Solid => collisions.push(Collision::Fatal {
                        snake: snake_index,
                        entry,
                    }),
                    ObjectType::Land => {}
                }
            }
        }

        collisions
    }

    fn resolve<R: Renderer + ?Sized>(
        &mut self,
        collisions: &[Collision],
        renderer: &mut R,
        report: &mut TickReport,
    ) {
        let mut removals = Vec::new();
        let mut eaters = Vec::new();
        let mut dead = Vec::new();
        let mut eaten_cell = None;

        for collision in collisions {
            match *collision {
                Collision::Food { snake, entry } => {
                    if !eaters.contains(&snake) {
                        eaters.push(snake);
                    }
                    if let Some(object) = self.registry.get(entry) {
                        eaten_cell = self.object_cell(object.kind);
                    }
                    removals.push(entry);
                }
                Collision::Fatal { snake, .. } => {
                    if !dead.contains(&snake) {
                        dead.push(snake);
                    }
                }
            }
        }

        for &snake in &eaters {
            self.snakes[snake].award_point();
            tracing::info!(snake, score = self.snakes[snake].score(), "food eaten");
        }

        let grown: Vec<(usize, usize)> = eaters
            .iter()
            .filter(|snake| !dead.contains(*snake))
            .map(|&snake| (snake, self.snakes[snake].grow(&self.grid)))
            .collect();

        for &snake in &dead {
            removals.extend(self.registry.segments_of(snake));
        }
        for entry in self.registry.remove_descending(removals) {
            if let Some(mesh) = entry.mesh {
                renderer.release(mesh);
            }
        }

        for &snake in &dead {
            tracing::info!(
                snake,
                head = ?self.snakes[snake].head_cell(),
                "fatal collision, rebuilding snake"
            );
            self.snakes[snake].reset(&self.grid);
            self.register_snake(snake, renderer);
        }

        for (snake, segment) in grown {
            self.register(ObjectKind::Segment { snake, segment }, renderer);
        }

        if let Some(eaten) = eaten_cell {
            let cell = food::spawn_cell_excluding(&mut self.rng, &self.grid, eaten);
            self.food = Food::new(&self.grid, cell);
            self.food_vision = Some(cell);
            self.register(ObjectKind::Food { cell }, renderer);
        }

        if !eaters.is_empty() {
            report.scores_changed = Some(self.scores());
        }
        report.eaten.extend(eaters);
        report.deaths.extend(dead);
    }

    /// Routes keyboard input to the snakes. The first W/A/S/D press takes the
    /// second snake away from the AI for the rest of the session.
    ///
    /// Returns false for [`GameInput::Quit`].
    pub fn apply_input(&mut self, input: GameInput) -> bool {
        match input {
            GameInput::Steer {
                slot: SnakeSlot::Player,
                direction,
            } => {
                if let Some(snake) = self.snakes.first_mut() {
                    snake.set_pending_direction(direction);
                }
                true
            }
            GameInput::Steer {
                slot: SnakeSlot::Second,
                direction,
            } => {
                if let Some(snake) = self.snakes.get_mut(1) {
                    if snake.cede_to_player() {
                        tracing::info!("second snake switched to manual control");
                    }
                    snake.set_pending_direction(direction);
                }
                true
            }
            GameInput::Quit => false,
        }
    }

    /// Replaces the current food with one on `cell`.
    pub fn place_food<R: Renderer + ?Sized>(&mut self, cell: CellId, renderer: &mut R) {
        let stale: Vec<usize> = self
            .registry
            .iter()
            .filter(|(_, entry)| entry.kind.object_type() == ObjectType::Food)
            .map(|(index, _)| index)
            .collect();
        for entry in self.registry.remove_descending(stale) {
            if let Some(mesh) = entry.mesh {
                renderer.release(mesh);
            }
        }

        self.food = Food::new(&self.grid, cell);
        self.food_vision = Some(cell);
        self.register(ObjectKind::Food { cell }, renderer);
    }

    /// Issues one draw call per drawable registry entry, in registry order.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R, view_projection: &Mat4) {
        renderer.begin_frame();
        for (_, entry) in self.registry.iter() {
            let Some(mesh) = entry.mesh else {
                continue;
            };
            renderer.draw(
                &DrawCall {
                    mesh,
                    model: Mat4::from_translation(self.object_position(entry.kind)),
                    shading: self.shading_for(entry.kind),
                    object_type: entry.kind.object_type(),
                },
                view_projection,
            );
        }
    }

    fn register_snake<R: Renderer + ?Sized>(&mut self, snake: usize, renderer: &mut R) {
        let order = self.snakes[snake].chain_order();
        for segment in order {
            self.register(ObjectKind::Segment { snake, segment }, renderer);
        }
    }

    fn register<R: Renderer + ?Sized>(&mut self, kind: ObjectKind, renderer: &mut R) -> usize {
        let drawable = Drawable {
            mesh: self.mesh_for(kind),
            shading: self.shading_for(kind),
        };
        let mesh = match renderer.upload(&drawable) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::warn!(?kind, %error, "mesh upload failed, object will not be drawn");
                None
            }
        };
        self.registry.push(kind, mesh)
    }

    fn mesh_for(&self, kind: ObjectKind) -> Mesh {
        let size = self.grid.cell_size();
        match kind {
            ObjectKind::Food { .. } => Mesh::cuboid(Vec3::splat(size * 0.3)),
            ObjectKind::Segment { .. } => Mesh::cuboid(Vec3::splat(size * 0.45)),
            ObjectKind::Wall { .. } => Mesh::cuboid(Vec3::splat(size * 0.5)),
            ObjectKind::Land { .. } => Mesh::tile(size * 0.5),
        }
    }

    fn shading_for(&self, kind: ObjectKind) -> Shading {
        match kind {
            ObjectKind::Food { .. } => Shading::Flat(self.food.color),
            ObjectKind::Segment { snake, segment } => {
                let snake = &self.snakes[snake];
                Shading::Textured {
                    texture: snake.skin(),
                    layer: snake.segment(segment).map_or(0, |s| s.layer),
                }
            }
            ObjectKind::Wall { .. } => Shading::Textured {
                texture: self.item_texture,
                layer: 0,
            },
            ObjectKind::Land { .. } => Shading::Textured {
                texture: self.item_texture,
                layer: 1,
            },
        }
    }

    /// Cell an object currently occupies.
    #[must_use]
    pub fn object_cell(&self, kind: ObjectKind) -> Option<CellId> {
        match kind {
            ObjectKind::Food { cell } | ObjectKind::Wall { cell } | ObjectKind::Land { cell } => {
                Some(cell)
            }
            ObjectKind::Segment { snake, segment } => {
                Some(self.snakes.get(snake)?.segment(segment)?.cell)
            }
        }
    }

    fn object_position(&self, kind: ObjectKind) -> Vec3 {
        match kind {
            ObjectKind::Food { .. } => self.food.position,
            ObjectKind::Segment { snake, segment } => self
                .snakes
                .get(snake)
                .and_then(|snake| snake.segment(segment))
                .map_or(Vec3::ZERO, |segment| segment.render_position),
            ObjectKind::Wall { cell } => self.grid.center(cell),
            ObjectKind::Land { cell } => {
                self.grid.center(cell) - Vec3::Z * (self.grid.cell_size() / 2.0)
            }
        }
    }

    #[must_use]
    pub fn scores(&self) -> ScoresChanged {
        ScoresChanged {
            player: self.snakes.first().map_or(0, Snake::score),
            auto: self.snakes.get(1).map_or(0, Snake::score),
        }
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        board_view_projection(&self.grid)
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    #[must_use]
    pub fn food(&self) -> &Food {
        &self.food
    }

    /// Food cell the autonomous snakes steer toward.
    #[must_use]
    pub fn food_vision(&self) -> Option<CellId> {
        self.food_vision
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn phase(&self) -> TickPhase {
        self.phase
    }
}
