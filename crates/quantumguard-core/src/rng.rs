//! Random Source for a single protocol run.
//!
//! Every run owns its own [`RandomSource`]. There is no process-wide generator:
//! a seed fixes every draw the run makes, and two runs never share state, so
//! independent simulations can execute concurrently without coordination.
//!
//! The generator is ChaCha8, which gives the same stream for the same seed on
//! every platform. Unseeded sources are keyed from the operating system's
//! entropy pool.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::protocol::Basis;

/// Owned, optionally seeded random stream.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl RandomSource {
    /// Seeded when `seed` is `Some`, OS-entropy keyed otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    /// Deterministic stream: the same seed and call sequence always yield the
    /// same draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-reproducible stream keyed from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
            seed: None,
        }
    }

    /// The seed this source was created with, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// One uniform bit (0 or 1).
    pub fn bit(&mut self) -> u8 {
        u8::from(self.rng.random::<bool>())
    }

    /// One uniform basis.
    pub fn basis(&mut self) -> Basis {
        if self.rng.random::<bool>() {
            Basis::X
        } else {
            Basis::Z
        }
    }

    /// One uniform real in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    pub fn bits(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.bit()).collect()
    }

    pub fn bases(&mut self, n: usize) -> Vec<Basis> {
        (0..n).map(|_| self.basis()).collect()
    }

    pub fn units(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.unit()).collect()
    }

    /// Draw `amount` distinct indices from `0..n` without replacement.
    ///
    /// Indices come back in draw order, not sorted. `amount` is capped at `n`,
    /// so `n == 0` always yields an empty vector.
    pub fn sample_without_replacement(&mut self, n: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(n);
        if amount == 0 {
            return Vec::new();
        }
        index::sample(&mut self.rng, n, amount).into_vec()
    }
}
