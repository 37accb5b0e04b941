//! Negacyclic NTT over Z_p[X]/(X^n + 1) with Montgomery arithmetic
//!
//! Evaluates at the odd powers of a primitive 2n-th root ψ (ψ^n = -1), so
//! negacyclic products become pointwise. Requires a prime p ≡ 1 (mod 2n).
//! One context type serves both moduli: q for ciphertext products and t,
//! where the transform is the slot map used by batching.
//!
//! ```
//! use fhe_doc_search::math::NttContext;
//!
//! let ctx = NttContext::new(256, 1032193);
//! let mut coeffs = vec![1u64; 256];
//! ctx.forward(&mut coeffs);
//! ctx.inverse(&mut coeffs);
//! assert_eq!(coeffs, vec![1u64; 256]);
//! ```

use super::modular::ModQ;

/// Twiddle tables and Montgomery constants for one (n, p)
///
/// Evaluation-form values are Montgomery-scaled: `forward` enters that form,
/// `inverse` leaves it.
#[derive(Clone)]
pub struct NttContext {
    n: usize,
    q: u64,
    /// -q⁻¹ mod 2^64
    q_inv_neg: u64,
    /// 2^128 mod q
    r_squared: u64,
    /// ψ powers, bit-reversed order, Montgomery form
    psi_powers: Vec<u64>,
    /// ψ⁻¹ powers, bit-reversed order, Montgomery form
    psi_inv_powers: Vec<u64>,
    /// n⁻¹ in Montgomery form
    n_inv: u64,
}

impl NttContext {
    /// # Panics
    ///
    /// If `n` is not a power of two or `q` is not ≡ 1 (mod 2n).
    pub fn new(n: usize, q: u64) -> Self {
        assert!(n.is_power_of_two(), "n must be a power of two");
        assert!(q % (2 * n as u64) == 1, "q must be ≡ 1 (mod 2n)");

        let q_inv_neg = Self::compute_q_inv_neg(q);
        let r_squared = Self::compute_r_squared(q);

        let psi = Self::find_primitive_root(2 * n as u64, q);
        let psi_mont = Self::to_montgomery(psi, q, r_squared, q_inv_neg);
        let psi_powers = Self::compute_twiddle_factors(n, psi_mont, q, q_inv_neg, r_squared);

        let psi_inv = ModQ::pow(psi, q - 2, q);
        let psi_inv_mont = Self::to_montgomery(psi_inv, q, r_squared, q_inv_neg);
        let psi_inv_powers =
            Self::compute_twiddle_factors(n, psi_inv_mont, q, q_inv_neg, r_squared);

        let n_inv_val = ModQ::pow(n as u64, q - 2, q);
        let n_inv = Self::to_montgomery(n_inv_val, q, r_squared, q_inv_neg);

        Self {
            n,
            q,
            q_inv_neg,
            r_squared,
            psi_powers,
            psi_inv_powers,
            n_inv,
        }
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// Cooley-Tukey, in place: coefficients in, Montgomery evaluations out
    pub fn forward(&self, coeffs: &mut [u64]) {
        assert_eq!(coeffs.len(), self.n, "Input length must match dimension");

        for c in coeffs.iter_mut() {
            *c = self.to_mont(*c);
        }

        let n = self.n;
        let q = self.q;
        let mut t = n;
        let mut m = 1;

        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let w = self.psi_powers[m + i];

                for j in j1..(j1 + t) {
                    let u = coeffs[j];
                    let v = self.montgomery_mul(coeffs[j + t], w);

                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    coeffs[j + t] = if u >= v { u - v } else { q - v + u };
                }
            }
            m <<= 1;
        }
    }

    /// Gentleman-Sande, in place: Montgomery evaluations in, coefficients out
    pub fn inverse(&self, coeffs: &mut [u64]) {
        assert_eq!(coeffs.len(), self.n, "Input length must match dimension");

        let q = self.q;
        let mut t = 1;
        let mut m = self.n;

        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = i * 2 * t;
                let w = self.psi_inv_powers[m + i];

                for j in j1..(j1 + t) {
                    let u = coeffs[j];
                    let v = coeffs[j + t];

                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    let diff = if u >= v { u - v } else { q - v + u };
                    coeffs[j + t] = self.montgomery_mul(diff, w);
                }
            }
            t <<= 1;
        }

        // Scale by n⁻¹, then leave Montgomery form
        for c in coeffs.iter_mut() {
            let scaled = self.montgomery_mul(*c, self.n_inv);
            *c = self.montgomery_mul(scaled, 1);
        }
    }

    /// Slot-wise product of two evaluation-form vectors
    pub fn pointwise_mul(&self, a: &[u64], b: &[u64], result: &mut [u64]) {
        assert_eq!(a.len(), self.n, "Input length must match dimension");
        assert_eq!(b.len(), self.n, "Input length must match dimension");
        assert_eq!(result.len(), self.n, "Output length must match dimension");

        for i in 0..self.n {
            result[i] = self.montgomery_mul(a[i], b[i]);
        }
    }

    #[inline]
    pub fn to_mont(&self, a: u64) -> u64 {
        Self::to_montgomery(a, self.q, self.r_squared, self.q_inv_neg)
    }

    #[inline]
    pub fn from_mont(&self, a: u64) -> u64 {
        self.montgomery_mul(a, 1)
    }

    #[inline]
    fn montgomery_mul(&self, a: u64, b: u64) -> u64 {
        Self::reduce(a as u128 * b as u128, self.q, self.q_inv_neg)
    }

    #[inline]
    fn reduce(ab: u128, q: u64, q_inv_neg: u64) -> u64 {
        let m = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
        let t = ((ab + m * (q as u128)) >> 64) as u64;
        if t >= q {
            t - q
        } else {
            t
        }
    }

    fn to_montgomery(a: u64, q: u64, r_squared: u64, q_inv_neg: u64) -> u64 {
        Self::reduce((a % q) as u128 * r_squared as u128, q, q_inv_neg)
    }

    /// -q^(-1) mod 2^64 by Hensel lifting one bit at a time
    fn compute_q_inv_neg(q: u64) -> u64 {
        let mut y: u64 = 1;
        for i in 1..64 {
            let yi = y.wrapping_mul(q) & (1u64 << i);
            y |= yi;
        }
        y.wrapping_neg()
    }

    fn compute_r_squared(q: u64) -> u64 {
        let r_mod_q = (1u128 << 64) % (q as u128);
        ((r_mod_q * r_mod_q) % (q as u128)) as u64
    }

    /// Find a primitive `order`-th root of unity modulo q (order a power of two)
    fn find_primitive_root(order: u64, q: u64) -> u64 {
        let exp = (q - 1) / order;

        for g in 2..q {
            let candidate = ModQ::pow(g, exp, q);
            // For a power-of-two order, ψ^(order/2) ≠ 1 means the order is exact
            if ModQ::pow(candidate, order / 2, q) != 1 {
                return candidate;
            }
        }
        panic!("no primitive {}-th root of unity mod {}", order, q);
    }

    /// Twiddle factors in bit-reversed order: factors[m + i] = ψ^bitrev(m + i)
    fn compute_twiddle_factors(
        n: usize,
        psi: u64,
        q: u64,
        q_inv_neg: u64,
        r_squared: u64,
    ) -> Vec<u64> {
        let mut factors = vec![0u64; n];
        let one = Self::to_montgomery(1, q, r_squared, q_inv_neg);
        factors[0] = one;

        for m in 1..n {
            if m.is_power_of_two() {
                // New level: ψ^(n/(2m))
                let exp = n / (2 * m);
                let mut pow = one;
                for _ in 0..exp {
                    pow = Self::reduce(pow as u128 * psi as u128, q, q_inv_neg);
                }
                factors[m] = pow;
            } else {
                // bitrev is additive over disjoint bits
                let prev_idx = m & (m - 1);
                let step_idx = m & m.wrapping_neg();
                factors[m] = Self::reduce(
                    factors[prev_idx] as u128 * factors[step_idx] as u128,
                    q,
                    q_inv_neg,
                );
            }
        }

        factors
    }
}

impl std::fmt::Debug for NttContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NttContext")
            .field("n", &self.n)
            .field("q", &self.q)
            .finish()
    }
}
