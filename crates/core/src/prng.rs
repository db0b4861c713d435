//! Seedable Xorshift64 PRNG for reproducible animations.
//!
//! Every random quantity in the engine (spawn positions, per-particle speed
//! limits, layout padding, formation perturbations) draws from this
//! generator, so a simulation is fully determined by its seed. Pure integer
//! state transitions keep the sequence identical across platforms.

use serde::{Deserialize, Serialize};

/// Xorshift64 generator with shift parameters (13, 7, 17).
///
/// A seed of 0 would be a fixed point of the algorithm and is replaced with
/// a non-zero fallback. Serializable so a paused simulation's randomness can
/// be captured mid-stream and resumed exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Replacement for the all-zeros fixed point.
    const FALLBACK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Creates a generator from `seed`, substituting the fallback for 0.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1), using the top 53 bits for full mantissa
    /// precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform f64 in [-limit, limit). The ± idiom used for seeding and
    /// re-randomizing particle velocities.
    pub fn next_signed(&mut self, limit: f64) -> f64 {
        self.next_range(-limit, limit)
    }

    /// Uniform angle in [0, 2π). Used for random padding points in
    /// formation layouts.
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * std::f64::consts::TAU
    }

    /// Uniform usize in [0, max) via modulo reduction.
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }
}
