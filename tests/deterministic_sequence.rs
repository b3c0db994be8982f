use std::time::Duration;

use voxel_snake::config::{GameConfig, SnakeConfig};
use voxel_snake::game::GameState;
use voxel_snake::grid::CellId;
use voxel_snake::input::{Direction, GameInput, SnakeSlot};
use voxel_snake::registry::ObjectType;
use voxel_snake::render::HeadlessRenderer;
use voxel_snake::snake::ControlMode;

fn config(snakes: Vec<SnakeConfig>) -> GameConfig {
    GameConfig {
        grid_width: 10,
        grid_height: 10,
        tick_ms: 100,
        min_snake_size: 8,
        seed: Some(42),
        snakes,
        ..GameConfig::default()
    }
}

fn player(col: u16, row: u16, direction: Direction) -> SnakeConfig {
    SnakeConfig {
        start: CellId::new(col, row),
        direction,
        control: ControlMode::Manual,
        skin: "builtin:snake".to_owned(),
    }
}

#[test]
fn stepwise_food_collection_and_wall_collision() {
    let mut renderer = HeadlessRenderer::new();
    let mut state = GameState::new(&config(vec![player(5, 5, Direction::Right)]), &mut renderer)
        .expect("state should build");
    let start: Vec<_> = state.snakes()[0].segments().map(|(_, s)| s.cell).collect();
    state.place_food(CellId::new(6, 5), &mut renderer);

    let report = state.update(Duration::from_millis(100), &mut renderer);
    assert_eq!(report.eaten, vec![0]);
    assert_eq!(state.snakes()[0].score(), 1);
    assert_eq!(state.snakes()[0].len(), 9);
    assert_eq!(state.registry().count(ObjectType::Food), 1);
    assert_ne!(state.food().cell, CellId::new(6, 5));

    // Keep the next food out of the way while driving into the top wall.
    state.place_food(CellId::new(1, 1), &mut renderer);
    state.apply_input(GameInput::Steer {
        slot: SnakeSlot::Player,
        direction: Direction::Up,
    });
    for row in 6..=10 {
        let report = state.update(Duration::from_millis(100), &mut renderer);
        assert!(report.deaths.is_empty());
        assert_eq!(state.snakes()[0].head_cell(), CellId::new(6, row));
    }

    let report = state.update(Duration::from_millis(100), &mut renderer);
    assert_eq!(report.deaths, vec![0]);

    let snake = &state.snakes()[0];
    let cells: Vec<_> = snake.segments().map(|(_, s)| s.cell).collect();
    assert_eq!(cells, start);
    assert_eq!(snake.len(), 8);
    assert_eq!(snake.score(), 1);
    assert_eq!(renderer.live_meshes(), state.registry().len());
}

#[test]
fn left_heading_snake_takes_one_step_per_tick() {
    let mut renderer = HeadlessRenderer::new();
    let mut state = GameState::new(&config(vec![player(5, 5, Direction::Left)]), &mut renderer)
        .expect("state should build");
    state.place_food(CellId::new(1, 10), &mut renderer);
    let tail = state.snakes()[0].tail_cell();

    // Input that would reverse straight into the neck is ignored.
    state.apply_input(GameInput::Steer {
        slot: SnakeSlot::Player,
        direction: Direction::Right,
    });
    let report = state.update(Duration::from_millis(100), &mut renderer);

    let snake = &state.snakes()[0];
    assert_eq!(report.ticks, 1);
    assert_eq!(snake.head_cell(), CellId::new(4, 5));
    assert_eq!(snake.len(), 8);
    assert!(!snake.occupies(tail));
}

#[test]
fn autonomous_rival_chases_food_until_it_eats() {
    let mut renderer = HeadlessRenderer::new();
    let mut rival = player(8, 3, Direction::Left);
    rival.control = ControlMode::Autonomous;
    rival.skin = "builtin:rival".to_owned();
    let mut config = config(vec![player(2, 9, Direction::Right), rival]);
    config.min_snake_size = 3;

    let mut state = GameState::new(&config, &mut renderer).expect("state should build");
    state.place_food(CellId::new(3, 6), &mut renderer);

    // Player turns down and circles in the top-left corner out of the way.
    let mut eaten_by_rival = false;
    for _ in 0..8 {
        let report = state.update(Duration::from_millis(100), &mut renderer);
        if report.eaten.contains(&1) {
            eaten_by_rival = true;
            break;
        }
        if report.deaths.contains(&0) {
            continue;
        }
        let turn = match state.snakes()[0].direction() {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        };
        state.apply_input(GameInput::Steer {
            slot: SnakeSlot::Player,
            direction: turn,
        });
    }

    assert!(eaten_by_rival);
    assert_eq!(state.scores().auto, 1);
    assert_eq!(state.snakes()[1].len(), 4);
}
