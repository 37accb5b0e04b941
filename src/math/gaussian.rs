//! Randomness for key generation and encryption
//!
//! Error terms are drawn from a discrete Gaussian; secrets for public-key
//! encryption come from the ternary distribution {-1, 0, 1}. Both share one
//! ChaCha20 stream so a whole key set can be reproduced from a single seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::modular::ModQ;

/// Default Gaussian standard deviation
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Discrete Gaussian D_σ over Z, truncated at 6σ, by rejection sampling
///
/// Also hands out its ChaCha20 stream for uniform draws so one seed fixes
/// every random choice of a key generation run.
#[derive(Clone)]
pub struct GaussianSampler {
    sigma: f64,
    bound: i64,
    rng: ChaCha20Rng,
}

impl GaussianSampler {
    /// Seeded from OS entropy
    pub fn new(sigma: f64) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::from_entropy())
    }

    /// Deterministic stream, for tests and reproducible benchmarks
    pub fn with_seed(sigma: f64, seed: u64) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn from_seed(sigma: f64, seed: [u8; 32]) -> Self {
        Self::from_rng(sigma, ChaCha20Rng::from_seed(seed))
    }

    fn from_rng(sigma: f64, rng: ChaCha20Rng) -> Self {
        Self {
            sigma,
            bound: (6.0 * sigma).ceil() as i64,
            rng,
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }

    /// One signed sample in [-6σ, 6σ]
    pub fn sample(&mut self) -> i64 {
        let denom = 2.0 * self.sigma * self.sigma;
        loop {
            let x = self.rng.gen_range(-self.bound..=self.bound);
            let accept = (-((x * x) as f64) / denom).exp();
            if self.rng.gen::<f64>() < accept {
                return x;
            }
        }
    }

    /// One sample reduced into [0, q)
    pub fn sample_centered(&mut self, q: u64) -> u64 {
        ModQ::from_signed(self.sample(), q)
    }

    pub fn sample_vec_centered(&mut self, len: usize, q: u64) -> Vec<u64> {
        (0..len).map(|_| self.sample_centered(q)).collect()
    }

    /// Uniform over {-1, 0, 1}, reduced into [0, q)
    pub fn sample_ternary_vec(&mut self, len: usize, q: u64) -> Vec<u64> {
        (0..len)
            .map(|_| ModQ::from_signed(self.rng.gen_range(-1i64..=1), q))
            .collect()
    }
}

impl std::fmt::Debug for GaussianSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaussianSampler")
            .field("sigma", &self.sigma)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}
