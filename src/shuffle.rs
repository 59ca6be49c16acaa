//! Unbiased Fisher-Yates shuffling over a pluggable integer sampler.
//!
//! Production runs draw from the operating system CSPRNG ([`SecureSampler`]). Tests and the
//! `--seed` debug flag use [`SeededSampler`] to make a run reproducible.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// Source of uniform integers in a half-open range.
pub trait IndexSampler {
    /// Return an integer drawn uniformly from `[low, high)`. Requires `low < high`.
    fn sample(&mut self, low: usize, high: usize) -> usize;
}

/// Sampler backed by the operating system's cryptographically secure generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureSampler;

impl IndexSampler for SecureSampler {
    fn sample(&mut self, low: usize, high: usize) -> usize {
        OsRng.gen_range(low..high)
    }
}

/// Deterministic sampler seeded from a `u64`.
#[derive(Clone, Debug)]
pub struct SeededSampler {
    rng: StdRng,
}

impl SeededSampler {
    /// Create a sampler whose sequence is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSampler for SeededSampler {
    fn sample(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..high)
    }
}

/// Return a uniformly random permutation of `items`. The input is left untouched.
///
/// For each `i` in `0..n`, `j` is drawn from `[i, n)` and positions `i` and `j` swap.
pub fn shuffled<T: Clone>(items: &[T], sampler: &mut impl IndexSampler) -> Vec<T> {
    let mut out = items.to_vec();
    let n = out.len();
    if n < 2 {
        return out;
    }
    for i in 0..n {
        let j = sampler.sample(i, n);
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/shuffle.rs"]
mod tests;
