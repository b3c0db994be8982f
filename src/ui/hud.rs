use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::game::ScoresChanged;
use crate::snake::ControlMode;

const SCORE_FLASH_DURATION: Duration = Duration::from_millis(1200);
const SCORE_BASE: Color = Color::Gray;
const SCORE_ACCENT: Color = Color::Rgb(255, 210, 64);

/// Values shown on the score strip.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub scores: ScoresChanged,
    /// Control mode of the second snake, if there is one.
    pub rival: Option<ControlMode>,
    /// When the last "scores changed" event arrived.
    pub scores_changed_at: Option<Instant>,
    pub now: Instant,
}

impl HudInfo {
    #[must_use]
    pub fn new(scores: ScoresChanged, rival: Option<ControlMode>) -> Self {
        Self {
            scores,
            rival,
            scores_changed_at: None,
            now: Instant::now(),
        }
    }

    /// Consumes a "scores changed" event.
    pub fn record_scores(&mut self, scores: ScoresChanged, at: Instant) {
        self.scores = scores;
        self.scores_changed_at = Some(at);
    }
}

/// Renders the one-line score strip and returns the play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: &HudInfo) -> Rect {
    let [play_area, score_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(score_line(info))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        score_area,
    );

    play_area
}

fn score_line(info: &HudInfo) -> Line<'static> {
    let value = Style::default()
        .fg(flash_color(info.scores_changed_at, info.now))
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::raw("player "),
        Span::styled(info.scores.player.to_string(), value),
    ];
    if let Some(mode) = info.rival {
        let label = match mode {
            ControlMode::Autonomous => "   ai ",
            ControlMode::Manual => "   p2 ",
        };
        spans.push(Span::raw(label));
        spans.push(Span::styled(info.scores.auto.to_string(), value));
    }
    spans.push(Span::raw("   [arrows/wasd] steer  [q] quit"));

    Line::from(spans)
}

fn flash_color(changed_at: Option<Instant>, now: Instant) -> Color {
    let Some(changed_at) = changed_at else {
        return SCORE_BASE;
    };
    let elapsed = now.saturating_duration_since(changed_at);
    if elapsed >= SCORE_FLASH_DURATION {
        return SCORE_BASE;
    }

    let t = elapsed.as_secs_f32() / SCORE_FLASH_DURATION.as_secs_f32();
    blend(SCORE_ACCENT, (229, 229, 229), t)
}

fn blend(from: Color, to: (u8, u8, u8), t: f32) -> Color {
    let Color::Rgb(fr, fg, fb) = from else {
        return from;
    };
    let t = t.clamp(0.0, 1.0);
    Color::Rgb(
        lerp_u8(fr, to.0, t),
        lerp_u8(fg, to.1, t),
        lerp_u8(fb, to.2, t),
    )
}

fn lerp_u8(from: u8, to: u8, t: f32) -> u8 {
    ((from as f32) + ((to as f32) - (from as f32)) * t).round() as u8
}
