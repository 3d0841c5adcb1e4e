//! RNG module - tile generation randomness
//!
//! Refill, reshuffle and color-bomb targeting all draw through [`TileRng`] so a
//! game is reproducible from its seed and tests can script exact outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform index source.
pub trait TileRng {
    /// Uniform value in `[0, n)`. `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
}

/// Seeded `StdRng`, the default for real games.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl TileRng for SeededRng {
    fn pick(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }
}

/// Replays a fixed script of picks, cycling when exhausted.
///
/// Each scripted value is reduced modulo `n`, so `SequenceRng::new(vec![0])`
/// always picks the first candidate.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<usize>,
    pos: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, pos: 0 }
    }

    /// Number of picks made so far.
    pub fn picks(&self) -> usize {
        self.pos
    }
}

impl TileRng for SequenceRng {
    fn pick(&mut self, n: usize) -> usize {
        if self.values.is_empty() {
            self.pos += 1;
            return 0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v % n
    }
}
