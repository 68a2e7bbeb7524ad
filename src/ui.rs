//! Terminal UI rendering with ratatui

use crate::board::{Board, Cell};
use crate::session::{Event, Session};
use crate::settings::Settings;
use crate::tetromino::{BlockColor, Skin, TetrominoKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + stats(20) = 54
const GAME_WIDTH: u16 = 54;
/// Total height needed: board(20) + 2 for borders
const GAME_HEIGHT: u16 = 22;

/// How long the board flashes when fever kicks in
const FLASH_DURATION: Duration = Duration::from_millis(600);

/// Glyph pairs for the photo-block face tiles
const FACE_TILES: [(&str, Color); 7] = [
    ("^^", Color::Rgb(230, 180, 140)),
    ("oo", Color::Rgb(200, 150, 110)),
    ("--", Color::Rgb(240, 200, 170)),
    ("**", Color::Rgb(170, 120, 90)),
    ("..", Color::Rgb(220, 170, 120)),
    ("~~", Color::Rgb(150, 100, 70)),
    ("''", Color::Rgb(250, 210, 180)),
];

/// Transient presentation state driven by session events
#[derive(Debug, Default)]
pub struct View {
    flash_until: Option<Instant>,
    /// Last notable action to display
    last_action: Option<String>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the events of one tick or command
    pub fn observe(&mut self, events: &[Event]) {
        self.observe_at(events, Instant::now());
    }

    fn observe_at(&mut self, events: &[Event], now: Instant) {
        for event in events {
            match event {
                Event::RowsCleared { count, points } => {
                    let name = match count {
                        1 => "Single",
                        2 => "Double",
                        3 => "Triple",
                        _ => "Tetris",
                    };
                    self.last_action = Some(format!("{} +{}", name, points));
                }
                Event::FeverActivated => {
                    self.flash_until = Some(now + FLASH_DURATION);
                    self.last_action = Some("FEVER!".to_string());
                }
                Event::FeverDeactivated => {
                    self.last_action = Some("Fever over".to_string());
                }
                Event::Held { kind } => {
                    self.last_action = Some(format!("Hold {}", kind.name()));
                }
                Event::Restarted => {
                    self.flash_until = None;
                    self.last_action = None;
                }
                _ => {}
            }
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.is_flashing_at(Instant::now())
    }

    fn is_flashing_at(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }
}

/// Terminal color for a block color
pub fn block_color(color: BlockColor) -> Color {
    match color {
        BlockColor::Blue => Color::Blue,
        BlockColor::Green => Color::Green,
        BlockColor::Yellow => Color::Yellow,
        BlockColor::Red => Color::Red,
        BlockColor::Orange => Color::Rgb(255, 165, 0),
        BlockColor::LightBlue => Color::Cyan,
        BlockColor::Purple => Color::Magenta,
    }
}

/// Text and style for one tile
fn tile(skin: Skin, block_char: &'static str) -> (&'static str, Style) {
    match skin {
        Skin::Color(color) => (block_char, Style::default().fg(block_color(color))),
        Skin::Face(idx) => {
            let (glyph, bg) = FACE_TILES[idx as usize % FACE_TILES.len()];
            (glyph, Style::default().fg(Color::Black).bg(bg))
        }
    }
}

/// Render the game screen
pub fn render_game(frame: &mut Frame, session: &Session, view: &View, settings: &Settings) {
    let area = frame.area();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: hold | board | stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Hold box
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(20), // Stats
        ])
        .split(game_area);

    if session.rules().hold {
        render_hold(frame, main_layout[0], session, settings);
    }
    render_board(frame, main_layout[1], session, view, settings);
    render_stats(frame, main_layout[2], session, view);

    if session.is_game_over() {
        let subtitle = format!("Score {} - R to restart", session.stats().score);
        render_overlay(frame, area, "GAME OVER", &subtitle);
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box
fn render_hold(frame: &mut Frame, area: Rect, session: &Session, settings: &Settings) {
    let border = if session.hold_available() {
        Color::Gray
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece) = session.held() {
        let (block_char, _) = settings.visual.block_chars();
        render_mini_piece(frame, inner, piece.kind(), piece.skins()[0], block_char);
    }
}

/// Render a small piece preview from its template
fn render_mini_piece(
    frame: &mut Frame,
    area: Rect,
    kind: TetrominoKind,
    skin: Skin,
    block_char: &'static str,
) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let shape = kind.template();
    let (text, style) = tile(skin, block_char);

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..4 {
        if !shape.iter().any(|&(_, cy)| cy == y) {
            continue;
        }
        let spans: Vec<Span> = (0..3)
            .map(|x| {
                if shape.contains(&(x, y)) {
                    Span::styled(text, style)
                } else {
                    Span::raw(EMPTY)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, session: &Session, view: &View, settings: &Settings) {
    let (block_char, landing_char) = settings.visual.block_chars();
    let board = session.board();

    let border_color = if view.is_flashing() {
        Color::Yellow
    } else if session.stats().fever_active {
        Color::LightRed
    } else {
        Color::White
    };
    let title = format!(" {} ", session.rules().variant.name());
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active = session.active();
    let landing = if settings.visual.show_landing {
        session.landing_cells()
    } else {
        None
    };

    // Render from top to bottom, buffer rows only ever show the active piece
    let mut lines: Vec<Line> = Vec::new();
    for y in 0..board.height() as i32 {
        let spans: Vec<Span> = (0..board.width() as i32)
            .map(|x| {
                let pos = (x, y);

                let active_skin = active.and_then(|piece| {
                    piece
                        .cells()
                        .iter()
                        .position(|&c| c == pos)
                        .map(|i| piece.skins()[i])
                });

                if let Some(skin) = active_skin {
                    let (text, style) = tile(skin, block_char);
                    return Span::styled(text, style);
                }

                let cell = shown_cell(board, x, y);
                if cell.is_empty() && landing.is_some_and(|cells| cells.contains(&pos)) {
                    return Span::styled(landing_char, Style::default().fg(Color::DarkGray));
                }

                match cell {
                    Cell::Filled(skin) => {
                        let (text, style) = tile(skin, block_char);
                        Span::styled(text, style)
                    }
                    Cell::Empty => Span::raw(EMPTY),
                }
            })
            .collect();

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Locked cell as drawn: the spawn buffer is always blank
fn shown_cell(board: &Board, x: i32, y: i32) -> Cell {
    if y < board.min_valid_row() as i32 {
        return Cell::Empty;
    }
    board.get(x, y).unwrap_or_default()
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, session: &Session, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fever = session.rules().fever;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(if fever { 3 } else { 0 }),
            Constraint::Min(1),
        ])
        .split(inner);

    let stats = session.stats();
    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", stats.score),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", stats.lines),
            Style::default().fg(Color::Green),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            session.rules().randomizer.name(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), layout[0]);

    if fever {
        render_fever_bar(frame, layout[1], stats.fever, stats.fever_active, view);
    }

    let mut footer = Vec::new();
    if let Some(action) = view.last_action() {
        footer.push(Line::styled(
            action.to_string(),
            Style::default().fg(Color::Magenta).bold(),
        ));
        footer.push(Line::raw(""));
    }
    footer.push(Line::styled(
        session.rules().variant.description(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(
        Paragraph::new(footer).wrap(ratatui::widgets::Wrap { trim: true }),
        layout[2],
    );
}

/// Render the fever meter
fn render_fever_bar(frame: &mut Frame, area: Rect, meter: u8, active: bool, view: &View) {
    let (title, color) = if active {
        (" FEVER x2 ", Color::LightRed)
    } else {
        (" FEVER ", Color::Red)
    };
    let gauge_color = if view.is_flashing() { Color::Yellow } else { color };

    let gauge = Gauge::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .gauge_style(Style::default().fg(gauge_color))
        .percent(u16::from(meter.min(100)));
    frame.render_widget(gauge, area);
}

/// Render an overlay (for game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 32u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
