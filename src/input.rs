//! Keyboard input mapped to session commands
//!
//! Soft drop needs a release edge. Terminals that never report key
//! releases are handled by treating a held key as released once its
//! auto-repeat stops arriving.

use crate::session::Command;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received.
/// Longer than the usual auto-repeat start delay.
const KEY_TIMEOUT: Duration = Duration::from_millis(550);

/// What a key press asks the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Game(Command),
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub hold: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let key = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let parsed = Self::parse_key(s);
                if parsed.is_none() {
                    tracing::warn!("Ignoring unknown key binding '{}'", s);
                }
                parsed
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            hold: Self::parse_keys(&settings.keys.hold),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

/// Input handler tracking the soft drop key
pub struct InputHandler {
    bindings: KeyBindings,
    /// Last time the soft drop key was seen while held
    soft_drop_seen: Option<Instant>,
    /// Terminal reports key releases, so no timeout is needed
    release_events: bool,
}

impl InputHandler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            soft_drop_seen: None,
            release_events: false,
        }
    }

    /// Rely on real release events instead of the repeat timeout
    pub fn set_release_events(&mut self, enabled: bool) {
        self.release_events = enabled;
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(KeyBindings::from_settings(settings))
    }

    /// Handle a key press or repeat
    pub fn key_down(&mut self, key: KeyEvent) -> Option<Input> {
        self.key_down_at(key, Instant::now())
    }

    fn key_down_at(&mut self, key: KeyEvent, now: Instant) -> Option<Input> {
        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Input::Quit);
        }

        let code = normalize_key(key.code);
        let b = &self.bindings;

        let command = if b.move_left.contains(&code) {
            Command::MoveLeft
        } else if b.move_right.contains(&code) {
            Command::MoveRight
        } else if b.soft_drop.contains(&code) {
            let first = self.soft_drop_seen.is_none();
            self.soft_drop_seen = Some(now);
            if !first {
                return None;
            }
            Command::SoftDropPress
        } else if b.hard_drop.contains(&code) {
            Command::HardDrop
        } else if b.rotate.contains(&code) {
            Command::Rotate
        } else if b.hold.contains(&code) {
            Command::Hold
        } else if b.restart.contains(&code) {
            Command::Restart
        } else if b.quit.contains(&code) {
            return Some(Input::Quit);
        } else {
            return None;
        };

        Some(Input::Game(command))
    }

    /// Handle a key release event (not reported by every terminal)
    pub fn key_up(&mut self, key: KeyEvent) -> Option<Input> {
        let code = normalize_key(key.code);
        if self.bindings.soft_drop.contains(&code) && self.soft_drop_seen.take().is_some() {
            return Some(Input::Game(Command::SoftDropRelease));
        }
        None
    }

    /// Release keys whose auto-repeat stopped (call every frame)
    pub fn update(&mut self) -> Option<Input> {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> Option<Input> {
        if self.release_events {
            return None;
        }
        match self.soft_drop_seen {
            Some(seen) if now.duration_since(seen) > KEY_TIMEOUT => {
                self.soft_drop_seen = None;
                Some(Input::Game(Command::SoftDropRelease))
            }
            _ => None,
        }
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
