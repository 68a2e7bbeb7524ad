//! FEVERTRIS - falling blocks with a fever meter
//!
//! Classic, Fever and Fever+Hold variants of the same simulation, played
//! in the terminal.

mod board;
mod input;
mod mode;
mod piece;
mod randomizer;
mod score;
mod session;
mod settings;
mod tetromino;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use input::{Input, InputHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::Session;
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use ui::View;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the fevertris temp directory, creating it if needed
fn fevertris_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("fevertris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file, the terminal is in raw mode while playing
    let log_dir = fevertris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fevertris=debug".parse::<tracing_subscriber::filter::Directive>()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "FEVERTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let rules = settings.rules();
    let mut session = match settings.gameplay.seed {
        Some(seed) => {
            tracing::info!("Using fixed seed {}", seed);
            Session::with_seed(rules, seed)
        }
        None => Session::new(rules),
    };

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!("Key release events supported: {}", release_events);

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut input = InputHandler::from_settings(&settings);
    input.set_release_events(release_events);

    // Run app and capture result
    let result = run_app(&mut terminal, &mut session, &mut input, &settings);

    // Restore terminal
    if release_events {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = &result {
        tracing::error!("Game loop failed: {}", e);
    }
    result?;

    let stats = session.stats();
    println!("\nThanks for playing FEVERTRIS!");
    println!("Variant: {}", session.rules().variant.name());
    println!("Final Score: {}", stats.score);
    println!("Lines: {} | Pieces: {}", stats.lines, session.pieces_spawned());
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    input: &mut InputHandler,
    settings: &Settings,
) -> io::Result<()> {
    let mut view = View::new();
    let mut last_tick = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| ui::render_game(frame, session, &view, settings))?;

        // Wait for input until the next tick is due
        let timeout = session
            .fall_delay()
            .saturating_sub(last_tick.elapsed())
            .min(FRAME_DURATION);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let pressed = match key.kind {
                    KeyEventKind::Release => input.key_up(key),
                    KeyEventKind::Press | KeyEventKind::Repeat => input.key_down(key),
                };
                match pressed {
                    Some(Input::Quit) => {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                    Some(Input::Game(command)) => {
                        let was_game_over = session.is_game_over();
                        view.observe(&session.apply(command));
                        if was_game_over && !session.is_game_over() {
                            last_tick = Instant::now();
                        }
                    }
                    None => {}
                }
            }
        }

        // Held keys whose repeats stopped
        if let Some(Input::Game(command)) = input.update() {
            view.observe(&session.apply(command));
        }

        // Gravity
        if last_tick.elapsed() >= session.fall_delay() {
            view.observe(&session.tick());
            last_tick = Instant::now();
        }
    }
}
