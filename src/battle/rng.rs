//! Injected randomness for combat resolution.
//!
//! Every random draw in the engine goes through a [`RollSource`] passed in by
//! the caller, together with a short reason string naming what the draw is for.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// A source of uniform rolls in `[0, 1)`.
pub trait RollSource {
    fn roll(&mut self, reason: &str) -> f64;
}

impl<T: RollSource + ?Sized> RollSource for &mut T {
    fn roll(&mut self, reason: &str) -> f64 {
        (**self).roll(reason)
    }
}

impl<T: RollSource + ?Sized> RollSource for Box<T> {
    fn roll(&mut self, reason: &str) -> f64 {
        (**self).roll(reason)
    }
}

/// Pseudo-random rolls from a seeded generator. Same seed, same sequence.
#[derive(Debug, Clone)]
pub struct SeededRolls {
    rng: StdRng,
}

impl SeededRolls {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system, for play outside of tests.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RollSource for SeededRolls {
    fn roll(&mut self, reason: &str) -> f64 {
        let value: f64 = self.rng.random();
        trace!(reason, value, "roll");
        value
    }
}

/// Replays a fixed list of rolls, for tests that need exact outcomes.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    outcomes: Vec<f64>,
    index: usize,
}

impl ScriptedRolls {
    pub fn new(outcomes: Vec<f64>) -> Self {
        Self { outcomes, index: 0 }
    }

    /// How many scripted rolls have been used so far.
    pub fn consumed(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len() - self.index
    }
}

impl RollSource for ScriptedRolls {
    /// # Panics
    ///
    /// Panics when the script runs out; a test supplied fewer rolls than the
    /// engine draws.
    fn roll(&mut self, reason: &str) -> f64 {
        let Some(&outcome) = self.outcomes.get(self.index) else {
            panic!(
                "ScriptedRolls exhausted! Tried to get a value for: '{}'. Need more rolls.",
                reason
            );
        };
        trace!(reason, outcome, "scripted roll");
        self.index += 1;
        outcome
    }
}

/// Map a unit roll onto `[low, high]`.
pub fn scale_roll(roll: f64, low: f64, high: f64) -> f64 {
    low + roll * (high - low)
}

/// Map a unit roll onto the inclusive integer range `[low, high]`.
pub fn roll_in_range(roll: f64, low: u32, high: u32) -> u32 {
    if high <= low {
        return low;
    }
    let span = (high - low) as f64 + 1.0;
    let offset = (roll * span).floor() as u32;
    low + offset.min(high - low)
}
