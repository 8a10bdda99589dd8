use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GamePhase, GameState, Position};
use crate::metrics::GameMetrics;

/// Each cell is drawn two columns wide so it looks square in a terminal
const CELL_WIDTH: u16 = 2;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state, metrics);
        frame.render_widget(stats, chunks[0]);

        let board_area = self.board_area(chunks[1], state);
        frame.render_widget(self.render_grid(state), board_area);

        match state.phase {
            GamePhase::Running => {}
            GamePhase::Paused => {
                let popup = centered(chunks[1], 30, 6);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_paused(), popup);
            }
            GamePhase::GameOver => {
                let popup = centered(chunks[1], 36, 9);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_game_over(state), popup);
            }
        }

        let controls = self.render_controls(state.phase);
        frame.render_widget(controls, chunks[2]);
    }

    /// Board size including its border, centered and clipped to `area`
    fn board_area(&self, area: Rect, state: &GameState) -> Rect {
        let width = (state.grid.width() as u16)
            .saturating_mul(CELL_WIDTH)
            .saturating_add(2);
        let height = (state.grid.height() as u16).saturating_add(2);
        centered(area, width, height)
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid.height());

        for y in 0..state.grid.height() {
            let mut spans = Vec::with_capacity(state.grid.width());

            for x in 0..state.grid.width() {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    // Snake head - distinct color
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::LightGreen)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("■ ", Style::default().fg(Color::Green))
                } else if pos == state.food.position {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled("· ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake Bite "),
        )
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_paused(&self) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press P to resume",
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let hint = |s: &'static str| Span::styled(s, Style::default().fg(Color::Gray));

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER!",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                hint("Press "),
                key("SPACE", Color::Green),
                hint(" to restart"),
            ]),
            Line::from(vec![hint("Press "), key("ESC", Color::Red), hint(" to quit")]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, phase: GamePhase) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("P", Style::default().fg(Color::Blue)),
            Span::raw(" to pause | "),
        ];
        if phase == GamePhase::GameOver {
            spans.push(Span::styled("SPACE", Style::default().fg(Color::Green)));
            spans.push(Span::raw(" to restart | "));
        }
        spans.push(Span::styled("ESC", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` rectangle centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
