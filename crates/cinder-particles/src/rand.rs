//! Seeded PRNG for template range sampling

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic random source shared by every effect in a system.
///
/// Same seed, same template, same frame timing: same particles.
pub struct ParticleRng {
    inner: Pcg32,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Returns a float in [min, max), or `min` when the interval is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}
