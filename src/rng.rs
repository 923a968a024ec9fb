//! Injectable random source for tie-breaking.
//!
//! Uses the `rand` crate with `SmallRng`, which is fast and works on WASM.
//! Entropy comes from `getrandom` (browser crypto API on wasm32). Sessions
//! that need reproducible decisions seed it explicitly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seedable RNG owned by one autopilot session.
pub struct MoveRng {
    inner: SmallRng,
}

impl MoveRng {
    /// Create from system entropy.
    pub fn new() -> Self {
        Self { inner: SmallRng::from_os_rng() }
    }

    /// Create with a specific seed for deterministic replay.
    pub fn from_seed(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed) }
    }

    /// Generate a random usize in [0, max).
    #[inline(always)]
    pub fn gen_range(&mut self, max: usize) -> usize {
        self.inner.random_range(0..max)
    }

    /// Pick a uniformly random element of `items`, or `None` when empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.gen_range(items.len())])
        }
    }
}

impl Default for MoveRng {
    fn default() -> Self {
        Self::new()
    }
}
