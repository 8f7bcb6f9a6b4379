//! Deterministic random source
//!
//! All random decisions of a run flow through one [`StimulusRng`]. The seed is kept so
//! it can be written to the manifest; replaying the same seed with the same catalog,
//! configuration and length reproduces the program bit for bit.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Number of architectural integer registers
pub const REGISTER_COUNT: u8 = 32;

#[derive(Debug, Clone)]
pub struct StimulusRng {
    seed: u64,
    inner: StdRng,
}

impl StimulusRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { seed, inner: StdRng::seed_from_u64(seed) }
    }

    /// Seed drawn from the operating system's entropy source
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `true` with probability `p`; `p >= 1.0` always hits, `p <= 0.0` never does
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.random::<f64>() < p
    }

    /// Uniform integer in `[low, high]`; returns `low` for an empty range
    pub fn between(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.inner.random_range(low..=high)
    }

    /// Uniform register index in `[0, 31]`
    pub fn register(&mut self) -> u8 {
        self.inner.random_range(0..REGISTER_COUNT)
    }

    /// Uniform pick; `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Index drawn proportionally to `weights`
    ///
    /// Returns `None` when no weight is positive or any weight is negative or not finite.
    pub fn weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.inner))
    }
}
