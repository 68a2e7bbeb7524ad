//! Scoring and the fever meter

/// Points for clearing 1, 2, 3 and 4 rows at once
pub const BASE_SCORE: [u64; 4] = [40, 100, 300, 1200];

/// Fever meter gained per cleared row
const FEVER_GAIN_PER_ROW: u8 = 25;
/// Fever meter lost after a streak of locks without clears
const FEVER_DECAY: u8 = 20;
/// Locks without a clear before the meter decays
const FEVER_DECAY_STREAK: u32 = 5;
pub const FEVER_MAX: u8 = 100;
const FEVER_MULTIPLIER: u64 = 2;

/// Running totals shown on the HUD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub score: u64,
    pub lines: u32,
    /// Fever meter, 0-100
    pub fever: u8,
    pub fever_active: bool,
    pub multiplier: u64,
    /// Locks since the last line clear
    pub pieces_since_clear: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            score: 0,
            lines: 0,
            fever: 0,
            fever_active: false,
            multiplier: 1,
            pieces_since_clear: 0,
        }
    }
}

/// What a single lock changed in the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreDelta {
    pub points: u64,
    pub lines: u32,
    pub fever_before: u8,
    pub fever_after: u8,
    /// Fever just switched on (triggers the flash)
    pub fever_activated: bool,
    pub fever_deactivated: bool,
}

/// Scoring strategy applied after every lock
pub trait Scorer {
    /// `rows` full rows were cleared (always at least 1)
    fn on_clear(&mut self, stats: &mut Stats, rows: usize) -> ScoreDelta;
    /// A piece locked without clearing anything
    fn on_no_clear(&mut self, stats: &mut Stats) -> ScoreDelta;
}

fn base_points(rows: usize) -> u64 {
    BASE_SCORE[rows.clamp(1, BASE_SCORE.len()) - 1]
}

/// Plain line-clear scoring, no fever
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicScorer;

impl Scorer for ClassicScorer {
    fn on_clear(&mut self, stats: &mut Stats, rows: usize) -> ScoreDelta {
        let points = base_points(rows);
        stats.score += points;
        stats.lines += rows as u32;
        stats.pieces_since_clear = 0;
        ScoreDelta {
            points,
            lines: rows as u32,
            fever_before: stats.fever,
            fever_after: stats.fever,
            ..ScoreDelta::default()
        }
    }

    fn on_no_clear(&mut self, stats: &mut Stats) -> ScoreDelta {
        stats.pieces_since_clear += 1;
        ScoreDelta {
            fever_before: stats.fever,
            fever_after: stats.fever,
            ..ScoreDelta::default()
        }
    }
}

/// Fever meter scoring: clears charge the meter, a full meter doubles
/// points until it drains
#[derive(Debug, Clone, Copy, Default)]
pub struct FeverScorer;

impl Scorer for FeverScorer {
    fn on_clear(&mut self, stats: &mut Stats, rows: usize) -> ScoreDelta {
        let fever_before = stats.fever;
        stats.pieces_since_clear = 0;

        let gain = (rows as u32 * FEVER_GAIN_PER_ROW as u32).min(FEVER_MAX as u32) as u8;
        stats.fever = stats.fever.saturating_add(gain).min(FEVER_MAX);

        let mut fever_activated = false;
        if stats.fever >= FEVER_MAX && !stats.fever_active {
            stats.fever_active = true;
            fever_activated = true;
        }
        stats.multiplier = if stats.fever_active { FEVER_MULTIPLIER } else { 1 };

        let points = base_points(rows) * stats.multiplier;
        stats.score += points;
        stats.lines += rows as u32;

        ScoreDelta {
            points,
            lines: rows as u32,
            fever_before,
            fever_after: stats.fever,
            fever_activated,
            fever_deactivated: false,
        }
    }

    fn on_no_clear(&mut self, stats: &mut Stats) -> ScoreDelta {
        let fever_before = stats.fever;
        let mut fever_deactivated = false;

        stats.pieces_since_clear += 1;
        if stats.pieces_since_clear >= FEVER_DECAY_STREAK {
            stats.fever = stats.fever.saturating_sub(FEVER_DECAY);
            stats.pieces_since_clear = 0;

            if stats.fever == 0 {
                fever_deactivated = stats.fever_active;
                stats.fever_active = false;
                stats.multiplier = 1;
            }
        }

        ScoreDelta {
            fever_before,
            fever_after: stats.fever,
            fever_deactivated,
            ..ScoreDelta::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clear() {
        let mut stats = Stats::new();
        let delta = FeverScorer.on_clear(&mut stats, 1);
        assert_eq!(delta.points, 40);
        assert_eq!(stats.score, 40);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.fever, 25);
        assert!(!stats.fever_active);
    }

    #[test]
    fn test_tetris_fills_meter_and_doubles() {
        let mut stats = Stats::new();
        let delta = FeverScorer.on_clear(&mut stats, 4);
        assert!(delta.fever_activated);
        assert!(stats.fever_active);
        assert_eq!(stats.fever, FEVER_MAX);
        assert_eq!(delta.points, 2400);
        assert_eq!(stats.lines, 4);
    }

    #[test]
    fn test_tetris_during_fever() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 4);
        let before = stats.score;
        let delta = FeverScorer.on_clear(&mut stats, 4);
        assert!(!delta.fever_activated);
        assert_eq!(stats.score - before, 2400);
    }

    #[test]
    fn test_meter_caps_at_max() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 3);
        assert_eq!(stats.fever, 75);
        FeverScorer.on_clear(&mut stats, 2);
        assert_eq!(stats.fever, FEVER_MAX);
    }

    #[test]
    fn test_decay_after_five_locks_without_clear() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 2);
        assert_eq!(stats.fever, 50);

        for _ in 0..4 {
            let delta = FeverScorer.on_no_clear(&mut stats);
            assert_eq!(delta.fever_after, 50);
        }
        let delta = FeverScorer.on_no_clear(&mut stats);
        assert_eq!(delta.fever_before, 50);
        assert_eq!(delta.fever_after, 30);
        assert_eq!(stats.pieces_since_clear, 0);
    }

    #[test]
    fn test_clear_resets_streak() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 1);
        for _ in 0..4 {
            FeverScorer.on_no_clear(&mut stats);
        }
        FeverScorer.on_clear(&mut stats, 1);
        for _ in 0..4 {
            FeverScorer.on_no_clear(&mut stats);
        }
        assert_eq!(stats.fever, 50);
    }

    #[test]
    fn test_fever_ends_when_meter_drains() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 4);
        assert!(stats.fever_active);

        let mut deactivated = false;
        for _ in 0..25 {
            deactivated |= FeverScorer.on_no_clear(&mut stats).fever_deactivated;
        }
        assert!(deactivated);
        assert_eq!(stats.fever, 0);
        assert!(!stats.fever_active);
        assert_eq!(stats.multiplier, 1);

        let delta = FeverScorer.on_clear(&mut stats, 1);
        assert_eq!(delta.points, 40);
    }

    #[test]
    fn test_fever_stays_active_while_meter_above_zero() {
        let mut stats = Stats::new();
        FeverScorer.on_clear(&mut stats, 4);
        for _ in 0..5 {
            FeverScorer.on_no_clear(&mut stats);
        }
        assert_eq!(stats.fever, 80);
        assert!(stats.fever_active);
        assert_eq!(FeverScorer.on_clear(&mut stats, 1).points, 80);
    }

    #[test]
    fn test_classic_scorer_ignores_fever() {
        let mut stats = Stats::new();
        assert_eq!(ClassicScorer.on_clear(&mut stats, 4).points, 1200);
        assert_eq!(ClassicScorer.on_clear(&mut stats, 2).points, 100);
        assert_eq!(stats.score, 1300);
        assert_eq!(stats.lines, 6);
        assert_eq!(stats.fever, 0);
        for _ in 0..10 {
            ClassicScorer.on_no_clear(&mut stats);
        }
        assert!(!stats.fever_active);
    }

    #[test]
    fn test_classic_clear_resets_streak() {
        let mut stats = Stats::new();
        ClassicScorer.on_no_clear(&mut stats);
        assert_eq!(stats.pieces_since_clear, 1);
        ClassicScorer.on_clear(&mut stats, 1);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.pieces_since_clear, 0);
    }
}
