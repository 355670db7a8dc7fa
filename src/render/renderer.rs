use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::game::{Grid, RoundController, RoundPhase, SmoothPoint};
use crate::metrics::SessionMetrics;
use crate::persistence::HighScoreStore;

const BACKGROUND: Color = Color::White;
const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;

/// Terminal columns per grid cell; with half-block pixels this gives each
/// cell a 2x2 pixel square, so eased points land between cells
const CELL_COLUMNS: u16 = 2;

/// A solid square on the canvas; `x`/`y` is its bottom-left corner in canvas
/// units (y grows upwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellShape {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Color,
}

impl CellShape {
    /// Place a cell from a screen-space top-left point (y grows downwards)
    pub fn from_point(point: SmoothPoint, grid: &Grid, color: Color) -> Self {
        let size = f64::from(grid.cell_size);
        let field_width = f64::from(grid.width) * size;
        let field_height = f64::from(grid.height) * size;

        let x = f64::from(point.x).clamp(0.0, field_width - size);
        let top = f64::from(point.y).clamp(0.0, field_height - size);

        Self {
            x,
            y: field_height - top - size,
            size,
            color,
        }
    }
}

impl Shape for CellShape {
    fn draw(&self, painter: &mut Painter) {
        // Stay just inside the far edges so neighbouring cells don't share a
        // row or column of pixels.
        let inner = self.size * 0.999;
        let top_left = painter.get_point(self.x, self.y + inner);
        let bottom_right = painter.get_point(self.x + inner, self.y);

        if let (Some((x0, y0)), Some((x1, y1))) = (top_left, bottom_right) {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    painter.paint(x, y, self.color);
                }
            }
        }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<S: HighScoreStore, R: Rng>(
        &self,
        frame: &mut Frame,
        round: &RoundController<S, R>,
        metrics: &SessionMetrics,
    ) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1), // Score
            Constraint::Min(0),    // Playing field
            Constraint::Length(2), // High score and controls
        ])
        .areas(frame.area());

        frame.render_widget(self.render_score(round.score()), header);

        let field = Self::field_area(body, &round.grid());
        frame.render_widget(self.render_field(round), field);

        if round.phase() == RoundPhase::GameOver {
            let popup = Self::centered(body, 28, 5);
            frame.render_widget(Clear, popup);
            frame.render_widget(self.render_game_over(), popup);
        }

        frame.render_widget(self.render_footer(round.high_score(), metrics), footer);
    }

    /// The bordered area giving every grid cell `CELL_COLUMNS` columns and
    /// as many half-block rows, centered in `area` and clipped to it
    fn field_area(area: Rect, grid: &Grid) -> Rect {
        let columns = (grid.width as u16).saturating_mul(CELL_COLUMNS);
        let rows = (grid.height as u16).saturating_mul(CELL_COLUMNS).div_ceil(2);
        Self::centered(area, columns.saturating_add(2), rows.saturating_add(2))
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
            .flex(Flex::Center)
            .areas(area);
        let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
            .flex(Flex::Center)
            .areas(row);
        cell
    }

    fn render_field<'a, S: HighScoreStore, R: Rng>(
        &self,
        round: &'a RoundController<S, R>,
    ) -> Canvas<'a, impl Fn(&mut ratatui::widgets::canvas::Context) + 'a> {
        let grid = round.grid();
        let size = f64::from(grid.cell_size);

        Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .title(" Snake "),
            )
            .marker(Marker::HalfBlock)
            .background_color(BACKGROUND)
            .x_bounds([0.0, f64::from(grid.width) * size])
            .y_bounds([0.0, f64::from(grid.height) * size])
            .paint(move |ctx| {
                for segment in round.snake().segments() {
                    ctx.draw(&CellShape::from_point(segment.point, &grid, SNAKE_COLOR));
                }
                if let Some(food) = round.food() {
                    ctx.draw(&CellShape::from_point(grid.to_point(food), &grid, FOOD_COLOR));
                }
            })
    }

    fn render_score(&self, score: u32) -> Paragraph<'static> {
        Paragraph::new(Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                score.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
    }

    fn render_game_over(&self) -> Paragraph<'static> {
        let text = vec![
            Line::from(Span::styled(
                "Game Over",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to restart",
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_footer(&self, high_score: u32, metrics: &SessionMetrics) -> Paragraph<'static> {
        let text = vec![
            Line::from(vec![
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    high_score.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Rounds: ", Style::default().fg(Color::Yellow)),
                Span::raw(metrics.rounds_played.to_string()),
                Span::raw("    "),
                Span::styled("Time: ", Style::default().fg(Color::Yellow)),
                Span::raw(metrics.format_time()),
            ]),
            Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
