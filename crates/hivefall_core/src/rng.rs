//! Injected randomness.
//!
//! The engine never reads a process-global generator. Every operation that
//! samples (spawn placement, loot rolls) takes a [`RandomSource`] so that a
//! replay of the same action sequence against the same source reproduces
//! the run exactly.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::{scale_to_index, Fixed};

/// A source of uniform fractions in `[0, 1)`.
///
/// Any `FnMut() -> Fixed` closure is a random source, which keeps scripted
/// sequences in tests a one-liner.
pub trait RandomSource {
    /// Draw the next uniform fraction in `[0, 1)`.
    fn next_fraction(&mut self) -> Fixed;

    /// Draw a uniform index in `0..bound` (0 when `bound` is 0).
    fn pick_below(&mut self, bound: u32) -> u32 {
        scale_to_index(self.next_fraction(), bound)
    }

    /// Draw against a probability; `true` with likelihood `chance`.
    fn roll(&mut self, chance: Fixed) -> bool {
        self.next_fraction() < chance
    }
}

impl<F> RandomSource for F
where
    F: FnMut() -> Fixed,
{
    fn next_fraction(&mut self) -> Fixed {
        self()
    }
}

/// Seeded ChaCha generator for reproducible runs and replays.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn next_fraction(&mut self) -> Fixed {
        // 32 random bits fill the fractional part exactly.
        Fixed::from_bits(i64::from(self.rng.next_u32()))
    }
}
