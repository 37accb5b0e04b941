//! Base-z digit decomposition for key switching
//!
//! A switching matrix row i encrypts z^i·s_from, so multiplying each row by
//! the i-th digit of c and summing gives an encryption of c·s_from with noise
//! proportional to z rather than q.

use serde::{Deserialize, Serialize};

use crate::math::Poly;
use crate::params::SchemeParams;

/// Digit base z (a power of two), digit count ℓ and the modulus they cover
///
/// ```
/// use fhe_doc_search::ks::GadgetVector;
/// use fhe_doc_search::params::DEFAULT_Q;
///
/// let gadget = GadgetVector::new(1 << 20, 3, DEFAULT_Q);
/// assert_eq!(gadget.powers(), vec![1, 1 << 20, 1 << 40]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetVector {
    pub base: u64,
    pub len: usize,
    pub q: u64,
}

impl GadgetVector {
    pub fn new(base: u64, len: usize, q: u64) -> Self {
        debug_assert!(base.is_power_of_two() && base > 1, "digit base {base} is not a power of two");
        debug_assert!(len > 0, "empty gadget");
        Self { base, len, q }
    }

    pub fn from_params(params: &SchemeParams) -> Self {
        Self::new(params.gadget_base, params.gadget_len, params.q)
    }

    fn digit_bits(&self) -> u32 {
        self.base.trailing_zeros()
    }

    /// z^i mod q for i in 0..ℓ
    pub fn powers(&self) -> Vec<u64> {
        let (z, q) = (self.base as u128, self.q as u128);
        std::iter::successors(Some(1u128), |p| Some(p * z % q))
            .take(self.len)
            .map(|p| p as u64)
            .collect()
    }

    /// Whether ℓ digits of z bits reach every residue below q
    pub fn covers_modulus(&self) -> bool {
        let bits = self.digit_bits() as usize * self.len;
        bits >= 64 || (self.q - 1) >> bits == 0
    }
}

/// Split the coefficients of `poly` into ℓ polynomials of digits in [0, z)
///
/// `poly` must be in coefficient form; Σ digitᵢ·zⁱ equals it exactly.
pub fn gadget_decompose(poly: &Poly, gadget: &GadgetVector) -> Vec<Poly> {
    let shift = gadget.digit_bits();
    let mask = gadget.base - 1;

    (0..gadget.len)
        .map(|i| {
            let offset = shift * i as u32;
            let digits = poly
                .coeffs()
                .iter()
                .map(|&c| c.checked_shr(offset).unwrap_or(0) & mask)
                .collect();
            Poly::from_coeffs(digits, poly.modulus())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_Q;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn recompose(digits: &[Poly], gadget: &GadgetVector) -> Poly {
        let n = digits[0].dimension();
        digits
            .iter()
            .zip(gadget.powers())
            .fold(Poly::zero(n, gadget.q), |acc, (d, z_i)| &acc + &d.scalar_mul(z_i))
    }

    #[test]
    fn test_digits_recompose_random_poly() {
        let gadget = GadgetVector::new(1 << 20, 3, DEFAULT_Q);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let poly = Poly::random_with_rng(128, DEFAULT_Q, &mut rng);

        let digits = gadget_decompose(&poly, &gadget);

        assert_eq!(digits.len(), 3);
        for d in &digits {
            assert!(d.coeffs().iter().all(|&c| c < gadget.base));
        }
        assert_eq!(recompose(&digits, &gadget), poly);
    }

    #[test]
    fn test_largest_residue() {
        let gadget = GadgetVector::new(1 << 20, 3, DEFAULT_Q);
        let poly = Poly::from_coeffs(vec![DEFAULT_Q - 1, 0, 1, 1 << 40], DEFAULT_Q);

        assert_eq!(recompose(&gadget_decompose(&poly, &gadget), &gadget), poly);
    }

    #[test]
    fn test_coverage() {
        assert!(GadgetVector::new(1 << 20, 3, DEFAULT_Q).covers_modulus());
        assert!(!GadgetVector::new(1 << 20, 2, DEFAULT_Q).covers_modulus());
    }
}
