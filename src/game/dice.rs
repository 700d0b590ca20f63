//! Turn resolution from settled dice.
//!
//! The physical roll happens elsewhere; this module only turns the settled
//! faces into a step count and decides whether the roll earns a bonus roll.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Highest face on the standard die.
pub const DIE_SIDES: u8 = 6;

/// Settled result of one roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// Face values in roll order.
    pub faces: Vec<u8>,
    /// Sum of all faces; the number of steps to walk.
    pub total: u32,
    /// Exactly two dice showing the same face.
    pub is_double: bool,
}

impl RollOutcome {
    /// Resolve a set of settled faces.
    ///
    /// Faces are expected in `1..=6`; the sum is taken as given.
    #[must_use]
    pub fn resolve(faces: &[u8]) -> Self {
        let total = faces.iter().map(|&f| u32::from(f)).sum();
        let is_double = matches!(faces, [a, b] if a == b);
        Self {
            faces: faces.to_vec(),
            total,
            is_double,
        }
    }
}

/// Supplier of settled dice faces.
pub trait DiceSource {
    /// Roll `count` dice and return their faces.
    fn roll(&mut self, count: usize) -> Vec<u8>;
}

/// Deterministic six-sided dice.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Create dice from a seed. Equal seeds give equal roll sequences.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll(&mut self, count: usize) -> Vec<u8> {
        (0..count)
            .map(|_| self.rng.random_range(1..=DIE_SIDES))
            .collect()
    }
}

/// Replays a fixed list of rolls, then falls back to ones.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<Vec<u8>>,
}

impl ScriptedDice {
    /// Queue the given rolls in order.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Rolls not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, count: usize) -> Vec<u8> {
        self.rolls.pop_front().unwrap_or_else(|| vec![1; count])
    }
}
