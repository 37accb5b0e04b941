//! Homomorphic operations on ciphertexts under one key set

use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::ks::key_switch;
use crate::ks::key_switch_poly;
use crate::math::{NttContext, Poly};
use crate::rlwe::{automorphism_ciphertext, RlweCiphertext};

use super::keys::{GaloisKeys, RelinKeys};

/// Three-component ciphertext decrypting as `b + a·s + a2·s²`
///
/// Produced by ciphertext products; relinearization brings it back to
/// an ordinary ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedCiphertext {
    pub b: Poly,
    pub a: Poly,
    pub a2: Poly,
}

/// Evaluator holding the relinearization and rotation keys
#[derive(Clone, Debug)]
pub struct Evaluator {
    relin_keys: RelinKeys,
    galois_keys: GaloisKeys,
    ntt: Arc<NttContext>,
}

impl Evaluator {
    pub fn new(relin_keys: RelinKeys, galois_keys: GaloisKeys, ntt: Arc<NttContext>) -> Self {
        Self {
            relin_keys,
            galois_keys,
            ntt,
        }
    }

    pub fn add(&self, lhs: &RlweCiphertext, rhs: &RlweCiphertext) -> RlweCiphertext {
        lhs.add(rhs)
    }

    /// Slot-wise difference: decrypts to `lhs - rhs` mod t
    pub fn sub(&self, lhs: &RlweCiphertext, rhs: &RlweCiphertext) -> RlweCiphertext {
        lhs.sub(rhs)
    }

    pub fn negate(&self, ct: &RlweCiphertext) -> RlweCiphertext {
        ct.negate()
    }

    /// Switch the `a2·s²` term back to the secret key
    pub fn relinearize(&self, ct: &ExtendedCiphertext) -> RlweCiphertext {
        let switched = key_switch_poly(&ct.a2, &self.relin_keys.0, &self.ntt);
        RlweCiphertext::from_parts(&ct.a + &switched.a, &ct.b + &switched.b)
    }

    /// Apply τ_g to the encrypted plaintext, permuting its slots
    ///
    /// Only elements with a generated rotation key are supported.
    pub fn apply_galois(&self, ct: &RlweCiphertext, g: usize) -> Result<RlweCiphertext> {
        let key = self
            .galois_keys
            .get(g)
            .ok_or(SearchError::MissingGaloisKey(g))?;
        let permuted = automorphism_ciphertext(ct, g);
        Ok(key_switch(&permuted, key, &self.ntt))
    }

    /// Galois elements with a rotation key, ascending
    pub fn galois_elements(&self) -> Vec<usize> {
        self.galois_keys.elements().collect()
    }
}
