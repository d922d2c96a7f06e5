//! Deterministic seeded random number generator.
//!
//! Uses the xorshift32 algorithm for fast, deterministic pseudo-random
//! numbers. The generator is injected into the simulation so tests can
//! supply a known seed and replay exact sequences of malfunction rolls.

use serde::{Deserialize, Serialize};

/// Deterministic seeded random number generator using xorshift32.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Creates a new RNG with the given seed.
    /// Seed of 0 is treated as 1 to avoid degenerate sequence.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Returns a random float between 0 (inclusive) and 1 (exclusive).
    pub fn next(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }

    /// Returns the raw u32 value from the RNG.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a random integer from 0 (inclusive) to max (exclusive).
    pub fn next_int(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Returns a random float in the range [min, max).
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next() * (max - min)
    }

    /// Returns a random boolean with the given probability of true.
    pub fn next_bool(&mut self, probability: f32) -> bool {
        self.next() < probability
    }

    /// Returns the current internal state (for debugging).
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(1)
    }
}
