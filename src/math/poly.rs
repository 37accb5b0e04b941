//! Polynomial operations over R_q = Z_q[X]/(X^n + 1).
//!
//! Polynomials can exist in either coefficient domain or NTT domain. Addition
//! and subtraction work in either (both operands must agree); multiplication
//! goes through the NTT.
//!
//! # Example
//!
//! ```
//! use fhe_doc_search::math::{NttContext, Poly};
//! use fhe_doc_search::params::DEFAULT_Q;
//!
//! let ctx = NttContext::new(256, DEFAULT_Q);
//! let mut rng = rand::thread_rng();
//!
//! let a = Poly::random_with_rng(256, DEFAULT_Q, &mut rng);
//! let b = Poly::random_with_rng(256, DEFAULT_Q, &mut rng);
//!
//! let product = a.mul_ntt(&b, &ctx);
//! assert_eq!(product.dimension(), 256);
//! ```

use super::gaussian::GaussianSampler;
use super::modular::ModQ;
use super::ntt::NttContext;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use zeroize::Zeroize;

/// Element of R_q = Z_q[X]/(X^n + 1), in coefficient or NTT form
///
/// NTT form holds Montgomery-scaled evaluations; only the NTT context that
/// produced them can interpret them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Poly {
    coeffs: Vec<u64>,
    q: u64,
    is_ntt: bool,
}

impl Poly {
    fn raw(coeffs: Vec<u64>, q: u64, is_ntt: bool) -> Self {
        Self { coeffs, q, is_ntt }
    }

    pub fn zero(dim: usize, q: u64) -> Self {
        Self::raw(vec![0; dim], q, false)
    }

    /// Coefficient-form polynomial; entries are reduced mod q
    pub fn from_coeffs(mut coeffs: Vec<u64>, q: u64) -> Self {
        coeffs.iter_mut().for_each(|c| *c %= q);
        Self::raw(coeffs, q, false)
    }

    pub fn constant(value: u64, dim: usize, q: u64) -> Self {
        let mut p = Self::zero(dim, q);
        p.coeffs[0] = value % q;
        p
    }

    /// Small error polynomial, coefficients from D_σ
    pub fn sample_gaussian(dim: usize, q: u64, sampler: &mut GaussianSampler) -> Self {
        Self::raw(sampler.sample_vec_centered(dim, q), q, false)
    }

    /// Coefficients uniform in {-1, 0, 1}
    pub fn sample_ternary(dim: usize, q: u64, sampler: &mut GaussianSampler) -> Self {
        Self::raw(sampler.sample_ternary_vec(dim, q), q, false)
    }

    /// Coefficients uniform in [0, q)
    pub fn random_with_rng<R: Rng>(dim: usize, q: u64, rng: &mut R) -> Self {
        Self::raw((0..dim).map(|_| rng.gen_range(0..q)).collect(), q, false)
    }

    pub fn dimension(&self) -> usize {
        self.coeffs.len()
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    pub fn is_ntt(&self) -> bool {
        self.is_ntt
    }

    /// Coefficient `i`; panics in NTT form
    pub fn coeff(&self, i: usize) -> u64 {
        assert!(!self.is_ntt, "coefficient access in NTT form");
        self.coeffs[i]
    }

    /// Raw values in the current form
    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn coeffs_mut(&mut self) -> &mut [u64] {
        &mut self.coeffs
    }

    pub fn to_ntt(&mut self, ctx: &NttContext) {
        if !self.is_ntt {
            ctx.forward(&mut self.coeffs);
            self.is_ntt = true;
        }
    }

    pub fn from_ntt(&mut self, ctx: &NttContext) {
        if self.is_ntt {
            ctx.inverse(&mut self.coeffs);
            self.is_ntt = false;
        }
    }

    pub fn to_ntt_new(&self, ctx: &NttContext) -> Self {
        let mut copy = self.clone();
        copy.to_ntt(ctx);
        copy
    }

    /// Multiply every coefficient by `scalar` (coefficient form only)
    pub fn scalar_mul(&self, scalar: u64) -> Self {
        assert!(!self.is_ntt, "scalar_mul in NTT form");
        let scalar = scalar % self.q;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| ModQ::mul(c, scalar, self.q))
            .collect();
        Self::raw(coeffs, self.q, false)
    }

    /// Negacyclic product; operands may be in either form, the result is in
    /// coefficient form
    pub fn mul_ntt(&self, other: &Self, ctx: &NttContext) -> Self {
        self.check_compatible(other);
        let mut product = self.to_ntt_new(ctx).mul_ntt_domain(&other.to_ntt_new(ctx), ctx);
        product.from_ntt(ctx);
        product
    }

    /// Pointwise product of two NTT-form polynomials
    pub fn mul_ntt_domain(&self, other: &Self, ctx: &NttContext) -> Self {
        assert!(self.is_ntt && other.is_ntt, "mul_ntt_domain needs NTT form");
        self.check_compatible(other);
        let mut out = vec![0u64; self.dimension()];
        ctx.pointwise_mul(&self.coeffs, &other.coeffs, &mut out);
        Self::raw(out, self.q, true)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// Largest |c| with coefficients centered in (-q/2, q/2]
    pub fn linf_norm(&self) -> u64 {
        assert!(!self.is_ntt, "norm in NTT form");
        self.coeffs
            .iter()
            .map(|&c| c.min(self.q - c))
            .max()
            .unwrap_or(0)
    }

    fn check_compatible(&self, other: &Self) {
        assert_eq!(self.q, other.q, "moduli differ");
        assert_eq!(self.dimension(), other.dimension(), "dimensions differ");
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64, u64) -> u64) -> Self {
        self.check_compatible(other);
        assert_eq!(self.is_ntt, other.is_ntt, "mixed NTT and coefficient form");
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(&a, &b)| op(a, b, self.q))
            .collect();
        Self::raw(coeffs, self.q, self.is_ntt)
    }
}

impl Zeroize for Poly {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl PartialEq for Poly {
    fn eq(&self, other: &Self) -> bool {
        self.q == other.q && self.is_ntt == other.is_ntt && self.coeffs == other.coeffs
    }
}

impl Eq for Poly {}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: Self) -> Poly {
        self.zip_with(rhs, ModQ::add)
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: Self) -> Poly {
        self.zip_with(rhs, ModQ::sub)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        let coeffs = self.coeffs.iter().map(|&c| ModQ::negate(c, self.q)).collect();
        Poly::raw(coeffs, self.q, self.is_ntt)
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, rhs: &Poly) {
        *self = &*self + rhs;
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, rhs: &Poly) {
        *self = &*self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_Q;

    fn ctx(n: usize) -> NttContext {
        NttContext::new(n, DEFAULT_Q)
    }

    #[test]
    fn test_constant_polynomial() {
        let p = Poly::constant(42, 256, DEFAULT_Q);
        assert_eq!(p.coeff(0), 42);
        assert!(p.coeffs()[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_sub_wraps_below_zero() {
        let q = DEFAULT_Q;
        let diff = &Poly::from_coeffs(vec![5, 6, 40, 8], q) - &Poly::from_coeffs(vec![10, 20, 30, 8], q);
        assert_eq!(diff.coeffs(), &[q - 5, q - 14, 10, 0]);
    }

    #[test]
    fn test_negation() {
        let q = DEFAULT_Q;
        let a = Poly::from_coeffs(vec![1, 2, 3, 0], q);
        let neg_a = -&a;

        assert_eq!(neg_a.coeff(0), q - 1);
        assert_eq!(neg_a.coeff(3), 0);
        assert!((&a + &neg_a).is_zero());
    }

    #[test]
    fn test_scalar_multiplication() {
        let a = Poly::from_coeffs(vec![1, 2, 3, 4], DEFAULT_Q);
        let b = a.scalar_mul(10);

        assert_eq!(b.coeffs(), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_square_of_binomial() {
        let n = 256;
        let ctx = ctx(n);

        // (1 + X)² = 1 + 2X + X²
        let mut one_plus_x = Poly::zero(n, DEFAULT_Q);
        one_plus_x.coeffs_mut()[..2].copy_from_slice(&[1, 1]);

        let square = one_plus_x.mul_ntt(&one_plus_x, &ctx);
        assert_eq!(&square.coeffs()[..3], &[1, 2, 1]);
        assert!(square.coeffs()[3..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_poly_mul_distributivity() {
        let n = 256;
        let ctx = ctx(n);
        let q = DEFAULT_Q;

        let a = Poly::from_coeffs((0..n as u64).map(|i| i % 50).collect(), q);
        let b = Poly::from_coeffs((0..n as u64).map(|i| (i * 3) % 50).collect(), q);
        let c = Poly::from_coeffs((0..n as u64).map(|i| (i * 5) % 50).collect(), q);

        let left = a.mul_ntt(&(&b + &c), &ctx);
        let right = &a.mul_ntt(&b, &ctx) + &a.mul_ntt(&c, &ctx);

        assert_eq!(left, right);
    }

    #[test]
    fn test_ntt_domain_addition_matches_coefficient_domain() {
        let n = 64;
        let ctx = ctx(n);
        let mut rng = rand::thread_rng();

        let a = Poly::random_with_rng(n, DEFAULT_Q, &mut rng);
        let b = Poly::random_with_rng(n, DEFAULT_Q, &mut rng);

        let mut sum_ntt = &a.to_ntt_new(&ctx) + &b.to_ntt_new(&ctx);
        sum_ntt.from_ntt(&ctx);

        assert_eq!(sum_ntt, &a + &b);
    }

    #[test]
    fn test_ternary_and_gaussian_are_small() {
        let mut sampler = GaussianSampler::with_seed(3.2, 1);
        let s = Poly::sample_ternary(512, DEFAULT_Q, &mut sampler);
        let e = Poly::sample_gaussian(512, DEFAULT_Q, &mut sampler);

        assert!(s.linf_norm() <= 1);
        assert!(e.linf_norm() <= 20);
    }

    #[test]
    fn test_zeroize_clears_coefficients() {
        let mut p = Poly::from_coeffs(vec![7; 16], DEFAULT_Q);
        p.zeroize();
        assert!(p.is_zero());
    }
}
