//! RLWE encryption and decryption
//!
//! Implements encryption: b = -a·s + e + Δ·m
//! where Δ = ⌊q/t⌋ is the scaling factor, and BFV-style decryption
//! m = ⌊t·(b + a·s)/q⌉ mod t.

use crate::math::{GaussianSampler, NttContext, Poly};
use crate::params::SchemeParams;

use super::types::{RlweCiphertext, RlwePublicKey, RlweSecretKey};

impl RlweSecretKey {
    /// Generate a secret key from Gaussian distribution
    pub fn generate(params: &SchemeParams, sampler: &mut GaussianSampler) -> Self {
        Self {
            poly: Poly::sample_gaussian(params.ring_dim, params.q, sampler),
        }
    }
}

impl RlwePublicKey {
    /// Generate a public key for `sk`: a fresh encryption of zero
    pub fn generate(
        sk: &RlweSecretKey,
        params: &SchemeParams,
        sampler: &mut GaussianSampler,
        ctx: &NttContext,
    ) -> Self {
        let a = Poly::random_with_rng(params.ring_dim, params.q, sampler.rng_mut());
        let e = Poly::sample_gaussian(params.ring_dim, params.q, sampler);

        let neg_a_s = -&a.mul_ntt(&sk.poly, ctx);
        let b = &neg_a_s + &e;

        Self { a, b }
    }
}

impl RlweCiphertext {
    /// Secret-key encryption of a message polynomial
    ///
    /// Computes: (a, b) where b = -a·s + e + Δ·m
    ///
    /// # Arguments
    /// * `sk` - Secret key
    /// * `message_poly` - Message polynomial (coefficients in [0, t))
    /// * `delta` - Scaling factor Δ = ⌊q/t⌋
    /// * `a_random` - Random polynomial a ∈ R_q
    /// * `error` - Error polynomial e sampled from Gaussian
    /// * `ctx` - NTT context for polynomial multiplication
    pub fn encrypt(
        sk: &RlweSecretKey,
        message_poly: &Poly,
        delta: u64,
        a_random: Poly,
        error: &Poly,
        ctx: &NttContext,
    ) -> Self {
        let scaled_msg = message_poly.scalar_mul(delta);

        let neg_a_s = -&a_random.mul_ntt(&sk.poly, ctx);

        // b = -a·s + e + Δ·m
        let b = &(&neg_a_s + error) + &scaled_msg;

        Self { a: a_random, b }
    }

    /// Public-key encryption of a message polynomial
    ///
    /// With ternary u and Gaussian e1, e2:
    /// ```text
    /// a = a_pk·u + e2
    /// b = b_pk·u + e1 + Δ·m
    /// ```
    /// so that `b + a·s = Δ·m + e_pk·u + e1 + e2·s`.
    pub fn encrypt_public(
        pk: &RlwePublicKey,
        message_poly: &Poly,
        delta: u64,
        sampler: &mut GaussianSampler,
        ctx: &NttContext,
    ) -> Self {
        let n = pk.ring_dim();
        let q = pk.modulus();

        let mut u = Poly::sample_ternary(n, q, sampler);
        u.to_ntt(ctx);
        let e1 = Poly::sample_gaussian(n, q, sampler);
        let e2 = Poly::sample_gaussian(n, q, sampler);

        let a = &pk.a.mul_ntt(&u, ctx) + &e2;
        let b = &(&pk.b.mul_ntt(&u, ctx) + &e1) + &message_poly.scalar_mul(delta);

        Self { a, b }
    }

    /// Phase of the ciphertext: b + a·s = Δ·m + e (mod q)
    pub fn phase(&self, sk: &RlweSecretKey, ctx: &NttContext) -> Poly {
        &self.a.mul_ntt(&sk.poly, ctx) + &self.b
    }

    /// Decrypt ciphertext to recover message polynomial
    ///
    /// Computes: m = ⌊t·(b + a·s)/q⌉ mod t
    pub fn decrypt(&self, sk: &RlweSecretKey, t: u64, ctx: &NttContext) -> Poly {
        let q = self.modulus();
        let phase = self.phase(sk, ctx);

        let coeffs: Vec<u64> = phase
            .coeffs()
            .iter()
            .map(|&v| {
                let scaled = (v as u128 * t as u128 + (q as u128 / 2)) / q as u128;
                (scaled % t as u128) as u64
            })
            .collect();

        Poly::from_coeffs(coeffs, t)
    }

    /// Homomorphic addition: decrypts to m1 + m2
    pub fn add(&self, other: &RlweCiphertext) -> RlweCiphertext {
        RlweCiphertext {
            a: &self.a + &other.a,
            b: &self.b + &other.b,
        }
    }

    /// Homomorphic subtraction: decrypts to m1 - m2
    pub fn sub(&self, other: &RlweCiphertext) -> RlweCiphertext {
        RlweCiphertext {
            a: &self.a - &other.a,
            b: &self.b - &other.b,
        }
    }

    /// Homomorphic negation: decrypts to -m
    pub fn negate(&self) -> RlweCiphertext {
        RlweCiphertext {
            a: -&self.a,
            b: -&self.b,
        }
    }
}
