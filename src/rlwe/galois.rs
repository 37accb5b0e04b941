//! Galois automorphisms for RLWE
//!
//! Galois automorphisms τ_g: R → R are ring automorphisms defined by
//! τ_g(X) = X^g for odd g ∈ Z_{2n}^*. On a batched plaintext they permute
//! the slots, which is what rotation keys are for.

use crate::math::{ModQ, Poly};

use super::types::RlweCiphertext;

/// Apply Galois automorphism τ_g to a polynomial in coefficient domain
///
/// τ_g(p(X)) = p(X^g) mod (X^n + 1)
///
/// X^i maps to X^(g·i mod 2n), negated when g·i mod 2n ≥ n.
pub fn apply_automorphism(poly: &Poly, g: usize) -> Poly {
    let d = poly.dimension();
    let q = poly.modulus();
    let two_d = 2 * d;

    let mut result_coeffs = vec![0u64; d];

    for i in 0..d {
        let coeff = poly.coeff(i);
        if coeff == 0 {
            continue;
        }

        let new_idx = (g * i) % two_d;
        if new_idx < d {
            result_coeffs[new_idx] = ModQ::add(result_coeffs[new_idx], coeff, q);
        } else {
            let idx = new_idx - d;
            result_coeffs[idx] = ModQ::sub(result_coeffs[idx], coeff, q);
        }
    }

    Poly::from_coeffs(result_coeffs, q)
}

/// Apply automorphism to RLWE ciphertext
///
/// The result is encrypted under τ_g(s); key-switching brings it back to s.
pub fn automorphism_ciphertext(ct: &RlweCiphertext, g: usize) -> RlweCiphertext {
    RlweCiphertext {
        a: apply_automorphism(&ct.a, g),
        b: apply_automorphism(&ct.b, g),
    }
}

/// Galois elements that get a rotation key: 3^(2^k) mod 2n for
/// k = 0..log2(n)-1, then the conjugation element 2n - 1.
///
/// Composing these reaches every element of (Z/2nZ)^*.
pub fn galois_elements(n: usize) -> Vec<usize> {
    debug_assert!(n.is_power_of_two() && n >= 4, "n must be a power of two >= 4");

    let two_n = 2 * n;
    let mut elements = Vec::with_capacity(n.trailing_zeros() as usize + 1);
    let mut g = 3 % two_n;
    for _ in 0..n.trailing_zeros() - 1 {
        elements.push(g);
        g = (g * g) % two_n;
    }
    elements.push(two_n - 1);
    elements
}

/// Check if g is a valid Galois element (odd and below 2n)
pub fn is_valid_galois_element(g: usize, n: usize) -> bool {
    g % 2 == 1 && g < 2 * n
}
