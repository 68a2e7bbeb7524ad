//! Piece randomizers
//!
//! The fever and hold variants use a "7-bag": all 7 kinds are shuffled,
//! then dealt out before reshuffling, which prevents long droughts. The
//! classic variant picks uniformly with replacement on every spawn, so
//! repeats and droughts are unbounded.

use crate::tetromino::TetrominoKind;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of the next piece kind
pub trait Randomizer {
    fn next(&mut self) -> TetrominoKind;
}

/// Which randomizer strategy a variant uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomizerKind {
    SevenBag,
    Uniform,
}

impl RandomizerKind {
    /// Build the strategy with its own RNG stream
    pub fn build(&self, seed: u64) -> Box<dyn Randomizer> {
        match self {
            RandomizerKind::SevenBag => Box::new(SevenBag::with_seed(seed)),
            RandomizerKind::Uniform => Box::new(UniformRandom::with_seed(seed)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RandomizerKind::SevenBag => "7-bag",
            RandomizerKind::Uniform => "uniform",
        }
    }
}

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct SevenBag {
    /// Kinds left in the current bag, dealt from the back
    bag: Vec<TetrominoKind>,
    rng: ChaCha8Rng,
}

impl SevenBag {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            bag: Vec::with_capacity(7),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Kinds still waiting in the current bag
    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    /// Refill the bag with a new Fisher-Yates shuffled set
    fn refill(&mut self) {
        self.bag.extend(TetrominoKind::all());
        self.bag.shuffle(&mut self.rng);
    }
}

impl Randomizer for SevenBag {
    fn next(&mut self) -> TetrominoKind {
        if self.bag.is_empty() {
            self.refill();
        }
        match self.bag.pop() {
            Some(kind) => kind,
            None => unreachable!("bag was just refilled"),
        }
    }
}

/// Uniform choice with replacement
#[derive(Debug, Clone)]
pub struct UniformRandom {
    rng: ChaCha8Rng,
}

impl UniformRandom {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Randomizer for UniformRandom {
    fn next(&mut self) -> TetrominoKind {
        let kinds = TetrominoKind::all();
        kinds[self.rng.gen_range(0..kinds.len())]
    }
}
