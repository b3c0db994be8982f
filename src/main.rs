use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxel_snake::config::{FRAME_POLL_INTERVAL_MS, GameConfig};
use voxel_snake::error::GameError;
use voxel_snake::game::GameState;
use voxel_snake::grid::Grid;
use voxel_snake::input::InputHandler;
use voxel_snake::render::{HeadlessRenderer, TerminalRenderer};
use voxel_snake::session::TerminalSession;
use voxel_snake::snake::Snake;
use voxel_snake::ui::hud::{HudInfo, render_hud};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding the default game settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for food placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many ticks without a terminal UI and print the outcome.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,

    /// Write logs to this file. The interactive game logs nowhere without it.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log every tick.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), GameError> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.headless {
        Some(ticks) => run_headless(&config, ticks),
        None => run(&config),
    }
}

fn init_logging(cli: &Cli) -> Result<(), GameError> {
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.headless.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

fn run(config: &GameConfig) -> Result<(), GameError> {
    config.validate()?;
    let grid = Grid::build(
        config.grid_width,
        config.grid_height,
        config.cell_size,
        config.origin(),
    )?;
    let mut renderer = TerminalRenderer::new(&grid);
    let mut state = GameState::new(config, &mut renderer)?;
    let view_projection = state.view_projection();

    let mut session = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let mut hud = HudInfo::new(state.scores(), state.snakes().get(1).map(Snake::control));
    let poll_interval = Duration::from_millis(FRAME_POLL_INTERVAL_MS);
    let mut last_frame = Instant::now();

    tracing::info!("interactive game started");
    'frames: loop {
        for game_input in input.poll_inputs(poll_interval)? {
            if !state.apply_input(game_input) {
                break 'frames;
            }
        }

        let now = Instant::now();
        let report = state.update(now.duration_since(last_frame), &mut renderer);
        last_frame = now;

        if let Some(scores) = report.scores_changed {
            hud.record_scores(scores, now);
        }
        hud.rival = state.snakes().get(1).map(Snake::control);
        hud.now = now;

        renderer.textures_mut().poll();
        state.render(&mut renderer, &view_projection);
        session.terminal_mut().draw(|frame| {
            let play_area = render_hud(frame, frame.area(), &hud);
            renderer.present(frame, play_area);
        })?;
    }

    let scores = state.scores();
    tracing::info!(
        player = scores.player,
        auto = scores.auto,
        ticks = state.tick_count(),
        "game ended"
    );
    Ok(())
}

fn run_headless(config: &GameConfig, ticks: u64) -> Result<(), GameError> {
    let mut renderer = HeadlessRenderer::new();
    let mut state = GameState::new(config, &mut renderer)?;
    let interval = state.tick_interval();

    let mut deaths = 0;
    for _ in 0..ticks {
        let report = state.update(interval, &mut renderer);
        deaths += report.deaths.len();
    }

    state.render(&mut renderer, &state.view_projection());
    tracing::debug!(draw_calls = renderer.frame().len(), "final frame");

    let scores = state.scores();
    let lengths: Vec<String> = state
        .snakes()
        .iter()
        .map(|snake| snake.len().to_string())
        .collect();
    println!(
        "{} ticks: player {} / rival {}, lengths [{}], {} deaths",
        state.tick_count(),
        scores.player,
        scores.auto,
        lengths.join(", "),
        deaths
    );
    Ok(())
}
