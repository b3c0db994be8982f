use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Canonical movement directions on the board.
///
/// `Up` increases the row (world y), `Right` increases the column (world x).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Column and row step for one move in this direction.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The two directions at a right angle to this one.
    #[must_use]
    pub fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::Up | Self::Down => [Self::Left, Self::Right],
            Self::Left | Self::Right => [Self::Up, Self::Down],
        }
    }
}

/// Which snake a steering key is routed to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SnakeSlot {
    /// Arrow keys.
    Player,
    /// W/A/S/D. The first press takes the snake away from the AI for good.
    Second,
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Steer {
        slot: SnakeSlot,
        direction: Direction,
    },
    Quit,
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Maps one key press to a game input.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let steer = |slot, direction| Some(GameInput::Steer { slot, direction });
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(GameInput::Quit)
        }
        KeyCode::Up => steer(SnakeSlot::Player, Direction::Up),
        KeyCode::Down => steer(SnakeSlot::Player, Direction::Down),
        KeyCode::Left => steer(SnakeSlot::Player, Direction::Left),
        KeyCode::Right => steer(SnakeSlot::Player, Direction::Right),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => steer(SnakeSlot::Second, Direction::Up),
            's' => steer(SnakeSlot::Second, Direction::Down),
            'a' => steer(SnakeSlot::Second, Direction::Left),
            'd' => steer(SnakeSlot::Second, Direction::Right),
            'q' => Some(GameInput::Quit),
            _ => None,
        },
        KeyCode::Esc => Some(GameInput::Quit),
        _ => None,
    }
}

/// Polls crossterm for keyboard events between frames.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Waits up to `timeout` for the first event, then drains whatever else is
    /// already queued so a burst of key presses lands before the next tick.
    pub fn poll_inputs(&mut self, timeout: Duration) -> io::Result<Vec<GameInput>> {
        let mut inputs = Vec::new();
        if !event::poll(timeout)? {
            return Ok(inputs);
        }

        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = map_key(key) {
                    inputs.push(input);
                }
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }

        Ok(inputs)
    }
}
