//! RLWE key and ciphertext types
//!
//! Every ciphertext here satisfies `b + a·s = Δ·m + e (mod q)`.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::math::Poly;

/// Secret key s with small coefficients, wiped on drop
///
/// ```
/// use fhe_doc_search::math::Poly;
/// use fhe_doc_search::params::DEFAULT_Q;
/// use fhe_doc_search::rlwe::RlweSecretKey;
///
/// let sk = RlweSecretKey::from_poly(Poly::zero(256, DEFAULT_Q));
/// assert_eq!(sk.ring_dim(), 256);
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RlweSecretKey {
    pub poly: Poly,
}

impl RlweSecretKey {
    pub fn from_poly(poly: Poly) -> Self {
        Self { poly }
    }

    pub fn ring_dim(&self) -> usize {
        self.poly.dimension()
    }

    pub fn modulus(&self) -> u64 {
        self.poly.modulus()
    }
}

impl Drop for RlweSecretKey {
    fn drop(&mut self) {
        self.poly.zeroize();
    }
}

impl std::fmt::Debug for RlweSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RlweSecretKey")
            .field("ring_dim", &self.ring_dim())
            .finish_non_exhaustive()
    }
}

/// Public key: an encryption of zero, `b = -a·s + e`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlwePublicKey {
    pub a: Poly,
    pub b: Poly,
}

impl RlwePublicKey {
    pub fn ring_dim(&self) -> usize {
        self.a.dimension()
    }

    pub fn modulus(&self) -> u64 {
        self.a.modulus()
    }
}

/// Ciphertext (a, b) with `b = -a·s + e + Δ·m`
///
/// Decryption rounds `t·(b + a·s)/q` to the nearest integer mod t.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlweCiphertext {
    pub a: Poly,
    pub b: Poly,
}

impl RlweCiphertext {
    pub fn from_parts(a: Poly, b: Poly) -> Self {
        debug_assert_eq!(a.dimension(), b.dimension(), "component dimensions differ");
        debug_assert_eq!(a.modulus(), b.modulus(), "component moduli differ");
        Self { a, b }
    }

    pub fn ring_dim(&self) -> usize {
        self.a.dimension()
    }

    pub fn modulus(&self) -> u64 {
        self.a.modulus()
    }
}
