//! Parameter sets for the batching homomorphic scheme
//!
//! Bounds on the ciphertext modulus follow the HomomorphicEncryption.org
//! security standard tables for ternary/Gaussian secrets.

use crate::error::{Result, SearchError};
use crate::math::ModQ;
use serde::{Deserialize, Serialize};

/// Ciphertext modulus: q = 2^60 - 2^14 + 1, prime, q ≡ 1 (mod 16384)
pub const DEFAULT_Q: u64 = 1152921504606830593;

/// Plaintext modulus: prime, t ≡ 1 (mod 16384), so batching works up to n = 8192
pub const DEFAULT_T: u64 = 1032193;

/// Security level for parameter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    /// 128-bit security (recommended)
    Bits128,
    /// 192-bit security
    Bits192,
    /// 256-bit security (conservative)
    Bits256,
    /// No security target; small rings for tests and benchmarks only
    None,
}

impl SecurityLevel {
    /// Largest admissible log2(q) for ring dimension `n`, or `None` when the
    /// standard does not cover `n`.
    pub fn max_modulus_bits(&self, n: usize) -> Option<u32> {
        let bound = match (self, n) {
            (SecurityLevel::None, _) => u32::MAX,
            (SecurityLevel::Bits128, 1024) => 27,
            (SecurityLevel::Bits128, 2048) => 54,
            (SecurityLevel::Bits128, 4096) => 109,
            (SecurityLevel::Bits128, 8192) => 218,
            (SecurityLevel::Bits128, 16384) => 438,
            (SecurityLevel::Bits192, 1024) => 19,
            (SecurityLevel::Bits192, 2048) => 37,
            (SecurityLevel::Bits192, 4096) => 75,
            (SecurityLevel::Bits192, 8192) => 152,
            (SecurityLevel::Bits192, 16384) => 305,
            (SecurityLevel::Bits256, 1024) => 14,
            (SecurityLevel::Bits256, 2048) => 29,
            (SecurityLevel::Bits256, 4096) => 58,
            (SecurityLevel::Bits256, 8192) => 118,
            (SecurityLevel::Bits256, 16384) => 237,
            _ => return None,
        };
        Some(bound)
    }
}

/// Core cryptographic parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeParams {
    /// Ring dimension n (power of two); also the number of batching slots
    pub ring_dim: usize,

    /// Ciphertext modulus q
    /// Must be NTT-friendly: q ≡ 1 (mod 2n)
    pub q: u64,

    /// Plaintext modulus t
    /// Must be prime with t ≡ 1 (mod 2n) for slot batching
    pub t: u64,

    /// Standard deviation for Gaussian error sampling
    pub sigma: f64,

    /// Gadget decomposition base z (power of two)
    pub gadget_base: u64,

    /// Number of digits in gadget decomposition: ℓ = ⌈log_z(q)⌉
    pub gadget_len: usize,

    /// Target security level
    pub security_level: SecurityLevel,
}

impl SchemeParams {
    /// 128-bit secure parameters for n = 4096 (4096 slots)
    pub fn bfv_4096() -> Self {
        Self {
            ring_dim: 4096,
            q: DEFAULT_Q,
            t: DEFAULT_T,
            sigma: 3.2,
            gadget_base: 1 << 20,
            gadget_len: 3,
            security_level: SecurityLevel::Bits128,
        }
    }

    /// 256-bit secure parameters for n = 8192 (8192 slots)
    pub fn bfv_8192() -> Self {
        Self {
            ring_dim: 8192,
            security_level: SecurityLevel::Bits256,
            ..Self::bfv_4096()
        }
    }

    /// Small, fast and insecure parameters for tests
    pub fn insecure_testing(ring_dim: usize) -> Self {
        Self {
            ring_dim,
            security_level: SecurityLevel::None,
            ..Self::bfv_4096()
        }
    }

    /// Scaling factor Δ = ⌊q/t⌋
    pub fn delta(&self) -> u64 {
        self.q / self.t
    }

    /// Number of plaintext slots per ciphertext
    pub fn slot_count(&self) -> usize {
        self.ring_dim
    }

    /// Bit size of the ciphertext modulus
    pub fn coeff_modulus_bits(&self) -> u32 {
        64 - self.q.leading_zeros()
    }

    /// Bit size of the plaintext modulus
    pub fn plain_modulus_bits(&self) -> u32 {
        64 - self.t.leading_zeros()
    }

    /// Check if parameters are valid
    pub fn validate(&self) -> Result<()> {
        let n = self.ring_dim;
        if !n.is_power_of_two() || n < 4 {
            return Err(SearchError::Parameter(format!(
                "ring_dim {} must be a power of two >= 4",
                n
            )));
        }

        let two_n = 2 * n as u64;
        if self.q % two_n != 1 || !ModQ::is_prime(self.q) {
            return Err(SearchError::Parameter(format!(
                "q = {} must be a prime ≡ 1 (mod {})",
                self.q, two_n
            )));
        }

        if self.t % two_n != 1 || !ModQ::is_prime(self.t) {
            return Err(SearchError::Parameter(format!(
                "t = {} must be a prime ≡ 1 (mod {}) for batching",
                self.t, two_n
            )));
        }

        if self.t >= self.q {
            return Err(SearchError::Parameter("t must be smaller than q".into()));
        }

        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return Err(SearchError::Parameter("sigma must be positive".into()));
        }

        if !self.gadget_base.is_power_of_two() || self.gadget_base < 2 || self.gadget_len == 0 {
            return Err(SearchError::Parameter(
                "gadget base must be a power of two >= 2 with at least one digit".into(),
            ));
        }

        let base_bits = self.gadget_base.trailing_zeros();
        if base_bits as usize * self.gadget_len < self.coeff_modulus_bits() as usize {
            return Err(SearchError::Parameter(format!(
                "gadget {}^{} does not cover q",
                self.gadget_base, self.gadget_len
            )));
        }

        match self.security_level.max_modulus_bits(n) {
            None => Err(SearchError::Parameter(format!(
                "no security estimate for ring_dim {} at {:?}",
                n, self.security_level
            ))),
            Some(max) if self.coeff_modulus_bits() > max => Err(SearchError::Parameter(format!(
                "log2(q) = {} exceeds {} bits allowed for ring_dim {} at {:?}",
                self.coeff_modulus_bits(),
                max,
                n,
                self.security_level
            ))),
            Some(_) => Ok(()),
        }
    }
}

impl Default for SchemeParams {
    fn default() -> Self {
        Self::bfv_4096()
    }
}
