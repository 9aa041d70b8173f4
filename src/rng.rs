//! Seeded randomness — the only source of chance in the simulation.
//!
//! Every random decision an agent or the ensemble makes is drawn from one
//! shared [`SeededRng`]. Output is a pure function of the seed and the order
//! of calls, so callers that need reproducibility must also fix their call
//! order (see [`crate::ensemble`]).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed substituted for zero.
const ZERO_SEED_REPLACEMENT: u32 = 0x6d2b_79f5;

/// Deterministic pseudo-random source built on ChaCha8.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: ChaCha8Rng,
    seed: u32,
}

impl SeededRng {
    /// Create a generator from a 32-bit seed. A zero seed is remapped to a
    /// fixed non-zero value.
    pub fn new(seed: u32) -> Self {
        let seed = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed as u64),
            seed,
        }
    }

    /// The effective seed (after zero remapping).
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform float in `[min, max)`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform integer in `[min, max]` inclusive. Consumes exactly one draw.
    ///
    /// If `max < min` the bounds are swapped.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if max < min { (max, min) } else { (min, max) };
        let span = (hi - lo + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i64;
        // next_f64 < 1.0, but guard the float edge anyway
        lo + offset.min(hi - lo)
    }

    /// Pick a uniformly random element. Returns `None` for an empty slice
    /// without consuming a draw.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// Cumulative-weight selection.
    ///
    /// A non-positive weight total selects the first option without drawing.
    /// When rounding leaves a remainder after the last weight, the last
    /// option is returned; under degenerate weights this biases toward it.
    pub fn weighted_pick<'a, T>(&mut self, options: &'a [T], weights: &[f64]) -> Option<&'a T> {
        let first = options.first()?;
        let count = options.len().min(weights.len());
        let total: f64 = weights[..count].iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Some(first);
        }

        let mut r = self.next_f64() * total;
        for (option, &weight) in options.iter().zip(weights).take(count) {
            r -= weight;
            if r <= 0.0 {
                return Some(option);
            }
        }
        options.get(count.saturating_sub(1))
    }
}
