//! Game session state machine
//!
//! A session cycles `Spawning → Falling → Locking → Clearing` until a lock
//! leaves blocks in the last buffer row, then sits in `GameOver` until a
//! restart. Gravity advances only through [`Session::tick`]; player input
//! arrives between ticks through [`Session::apply`]. Both return the list of
//! [`Event`]s describing what changed, so rendering never has to inspect the
//! simulation mid-step.
//!
//! The terminal view redraws from state each frame and only folds the
//! transient events (clears, fever, hold) into its status line. `Spawned`,
//! `Moved`, `Locked` and `Hud` carry enough data for a renderer that draws
//! incrementally instead.

use crate::board::Board;
use crate::mode::Rules;
use crate::piece::Piece;
use crate::randomizer::Randomizer;
use crate::score::{ScoreDelta, Scorer, Stats};
use crate::tetromino::{Skin, TetrominoKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info};

type Cells = [(i32, i32); 4];

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next tick to bring in a piece
    Spawning,
    Falling,
    Locking,
    Clearing,
    GameOver,
}

/// Player commands the session can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDropPress,
    SoftDropRelease,
    HardDrop,
    Hold,
    Restart,
}

/// A change produced by a tick or a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Spawned { kind: TetrominoKind, cells: Cells },
    /// The active piece moved or rotated
    Moved { from: Cells, to: Cells },
    Locked { cells: Cells, skins: [Skin; 4] },
    RowsCleared { count: usize, points: u64 },
    FeverActivated,
    FeverDeactivated,
    Held { kind: TetrominoKind },
    Hud { score: u64, lines: u32, fever: u8 },
    GameOver { score: u64 },
    Restarted,
}

/// The main session struct
pub struct Session {
    rules: Rules,
    board: Board,
    phase: Phase,
    /// Current falling piece
    active: Option<Piece>,
    /// Held piece (can swap once per spawn)
    held: Option<Piece>,
    hold_available: bool,
    randomizer: Box<dyn Randomizer>,
    scorer: Box<dyn Scorer>,
    /// Drives skin choice and the seeds of restarted games
    rng: ChaCha8Rng,
    stats: Stats,
    fall_delay: Duration,
    pieces_spawned: u64,
}

impl Session {
    /// Create a new session with random seed
    pub fn new(rules: Rules) -> Self {
        Self::with_seed(rules, rand::random())
    }

    /// Create a reproducible session
    pub fn with_seed(rules: Rules, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let randomizer = rules.randomizer.build(rng.r#gen());
        Self::with_randomizer(rules, randomizer, rng)
    }

    /// Create a session drawing pieces from a custom randomizer
    pub fn with_randomizer(rules: Rules, randomizer: Box<dyn Randomizer>, rng: ChaCha8Rng) -> Self {
        debug!(
            "New {} session, randomizer={}",
            rules.variant.name(),
            rules.randomizer.name()
        );
        Self {
            rules,
            board: Board::new(),
            phase: Phase::Spawning,
            active: None,
            held: None,
            hold_available: true,
            randomizer,
            scorer: rules.scorer(),
            rng,
            stats: Stats::new(),
            fall_delay: rules.base_delay,
            pieces_spawned: 0,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn held(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    pub fn hold_available(&self) -> bool {
        self.hold_available
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Interval until the next tick should fire
    pub fn fall_delay(&self) -> Duration {
        self.fall_delay
    }

    pub fn pieces_spawned(&self) -> u64 {
        self.pieces_spawned
    }

    pub fn is_game_over(&self) -> bool {
        self.phase() == Phase::GameOver
    }

    /// Where the active piece would land
    pub fn landing_cells(&self) -> Option<Cells> {
        self.active.as_ref().map(|piece| {
            let distance = piece.drop_distance(&self.board);
            piece.cells().map(|(x, y)| (x, y + distance))
        })
    }

    /// Advance gravity by one step
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Spawning => self.spawn(&mut events),
            Phase::Falling => self.fall(&mut events),
            Phase::Locking | Phase::Clearing => self.settle(&mut events),
            Phase::GameOver => {}
        }
        events
    }

    /// Process a player command
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();

        if self.phase == Phase::GameOver {
            match command {
                Command::Restart => self.restart(&mut events),
                Command::SoftDropRelease => self.fall_delay = self.rules.base_delay,
                _ => {}
            }
            return events;
        }

        match command {
            Command::MoveLeft => self.shift(-1, &mut events),
            Command::MoveRight => self.shift(1, &mut events),
            Command::Rotate => self.rotate(&mut events),
            Command::SoftDropPress => self.fall_delay = self.rules.soft_drop_delay(),
            Command::SoftDropRelease => self.fall_delay = self.rules.base_delay,
            Command::HardDrop => self.hard_drop(&mut events),
            Command::Hold => self.hold(&mut events),
            Command::Restart => {
                // Only meaningful after game over
            }
        }
        events
    }

    fn shift(&mut self, dx: i32, events: &mut Vec<Event>) {
        if let Some(piece) = &mut self.active {
            let from = *piece.cells();
            if piece.try_translate(&self.board, dx, 0) {
                events.push(Event::Moved {
                    from,
                    to: *piece.cells(),
                });
            }
        }
    }

    fn rotate(&mut self, events: &mut Vec<Event>) {
        if let Some(piece) = &mut self.active {
            let from = *piece.cells();
            if piece.rotate(&self.board) {
                events.push(Event::Moved {
                    from,
                    to: *piece.cells(),
                });
            }
        }
    }

    fn hard_drop(&mut self, events: &mut Vec<Event>) {
        if !self.rules.hard_drop {
            return;
        }
        let Some(piece) = &mut self.active else {
            return;
        };

        let from = *piece.cells();
        let distance = piece.hard_drop(&self.board);
        if distance > 0 {
            events.push(Event::Moved {
                from,
                to: *piece.cells(),
            });
        }
        self.phase = Phase::Locking;
        self.settle(events);
    }

    fn hold(&mut self, events: &mut Vec<Event>) {
        if !self.rules.hold || !self.hold_available {
            return;
        }
        let Some(current) = self.active.take() else {
            return;
        };

        let kind = current.kind();
        debug!("Holding {}", kind.name());
        events.push(Event::Held { kind });

        match self.held.replace(current) {
            Some(mut swapped) => {
                swapped.reset_position(self.board.width());
                self.bring_in(swapped, events);
            }
            None => self.spawn(events),
        }
        self.hold_available = false;
    }

    fn fall(&mut self, events: &mut Vec<Event>) {
        let Some(piece) = &mut self.active else {
            self.phase = Phase::Spawning;
            return;
        };

        let from = *piece.cells();
        if piece.try_translate(&self.board, 0, 1) {
            events.push(Event::Moved {
                from,
                to: *piece.cells(),
            });
        } else {
            self.phase = Phase::Locking;
            self.settle(events);
        }
    }

    /// Draw a new piece from the randomizer and put it at the top
    fn spawn(&mut self, events: &mut Vec<Event>) {
        let kind = self.randomizer.next();
        let skins = self.rules.skins.pick(&mut self.rng);
        let mut piece = Piece::new(kind, skins);
        piece.reset_position(self.board.width());

        self.pieces_spawned += 1;
        self.hold_available = true;
        debug!("Spawned {} (#{})", kind.name(), self.pieces_spawned);

        self.bring_in(piece, events);
        events.push(Event::Hud {
            score: self.stats.score,
            lines: self.stats.lines,
            fever: self.stats.fever,
        });
    }

    /// Make `piece` the active piece, or end the game if it has no room
    fn bring_in(&mut self, piece: Piece, events: &mut Vec<Event>) {
        if piece.collides_at(&self.board, 0, 0) {
            info!("Block out while spawning {}", piece.kind().name());
            self.game_over(events);
            return;
        }
        events.push(Event::Spawned {
            kind: piece.kind(),
            cells: *piece.cells(),
        });
        self.active = Some(piece);
        self.phase = Phase::Falling;
    }

    /// Run Locking and Clearing for the active piece
    fn settle(&mut self, events: &mut Vec<Event>) {
        if self.phase == Phase::Locking {
            let Some(piece) = self.active.take() else {
                self.phase = Phase::Spawning;
                return;
            };
            self.board.lock(&piece);
            debug!("Locked {} at {:?}", piece.kind().name(), piece.cells());
            events.push(Event::Locked {
                cells: *piece.cells(),
                skins: *piece.skins(),
            });
            self.phase = Phase::Clearing;
        }

        let rows = self.board.clear_full_rows();
        let delta = if rows > 0 {
            self.scorer.on_clear(&mut self.stats, rows)
        } else {
            self.scorer.on_no_clear(&mut self.stats)
        };
        self.report(rows, delta, events);

        if self.board.top_row_occupied() {
            self.game_over(events);
        } else {
            self.phase = Phase::Spawning;
        }
    }

    fn report(&self, rows: usize, delta: ScoreDelta, events: &mut Vec<Event>) {
        if rows > 0 {
            debug!(
                "Cleared {} rows for {} points (fever {} -> {})",
                delta.lines, delta.points, delta.fever_before, delta.fever_after
            );
            if self.board.is_empty() {
                debug!("All clear");
            }
            events.push(Event::RowsCleared {
                count: rows,
                points: delta.points,
            });
        }
        if delta.fever_activated {
            info!("Fever activated, multiplier x{}", self.stats.multiplier);
            events.push(Event::FeverActivated);
        }
        if delta.fever_deactivated {
            info!("Fever ended");
            events.push(Event::FeverDeactivated);
        }
    }

    fn game_over(&mut self, events: &mut Vec<Event>) {
        self.active = None;
        self.phase = Phase::GameOver;
        info!(
            "Game over: score={} lines={} pieces={}",
            self.stats.score, self.stats.lines, self.pieces_spawned
        );
        events.push(Event::GameOver {
            score: self.stats.score,
        });
    }

    /// Reset everything and go back to spawning
    fn restart(&mut self, events: &mut Vec<Event>) {
        let seed: u64 = self.rng.r#gen();
        self.randomizer = self.rules.randomizer.build(seed);
        self.scorer = self.rules.scorer();
        self.board = Board::new();
        self.active = None;
        self.held = None;
        self.hold_available = true;
        self.stats = Stats::new();
        self.fall_delay = self.rules.base_delay;
        self.pieces_spawned = 0;
        self.phase = Phase::Spawning;
        info!("Restarted {} session", self.rules.variant.name());
        events.push(Event::Restarted);
    }

    #[cfg(test)]
    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }
}
