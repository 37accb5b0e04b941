//! Slot batching: packs up to n integers mod t into one plaintext polynomial
//!
//! Because t ≡ 1 (mod 2n), X^n + 1 splits completely mod t and
//! Z_t[X]/(X^n + 1) is isomorphic to Z_t^n. The slots are the evaluations of
//! the plaintext polynomial at the primitive 2n-th roots of unity, so the NTT
//! modulo t maps slots to coefficients and back. Slot-wise addition and
//! subtraction of plaintexts are then ring operations, which the ciphertexts
//! carry through homomorphically.

use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::math::{NttContext, Poly};
use crate::params::SchemeParams;

/// Plaintext polynomial with coefficients mod t
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    poly: Poly,
}

impl Plaintext {
    pub fn from_poly(poly: Poly) -> Self {
        Self { poly }
    }

    pub fn poly(&self) -> &Poly {
        &self.poly
    }

    /// Lift coefficients into R_q for encryption (values stay in [0, t))
    pub fn lift(&self, q: u64) -> Poly {
        Poly::from_coeffs(self.poly.coeffs().to_vec(), q)
    }
}

/// Batch encoder for the plaintext modulus t
#[derive(Clone, Debug)]
pub struct BatchEncoder {
    t: u64,
    ntt: Arc<NttContext>,
}

impl BatchEncoder {
    pub fn new(params: &SchemeParams) -> Self {
        Self {
            t: params.t,
            ntt: Arc::new(NttContext::new(params.slot_count(), params.t)),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.ntt.dimension()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.t
    }

    /// Encode up to `slot_count` values, zero-filling the remaining slots
    ///
    /// Fails with `Encoding` on too many values or a value ≥ t.
    pub fn encode(&self, values: &[u64]) -> Result<Plaintext> {
        let n = self.slot_count();
        if values.len() > n {
            return Err(SearchError::Encoding(format!(
                "{} values exceed {} slots",
                values.len(),
                n
            )));
        }
        if let Some(&v) = values.iter().find(|&&v| v >= self.t) {
            return Err(SearchError::Encoding(format!(
                "value {} is not below the plaintext modulus {}",
                v, self.t
            )));
        }

        let mut slots = vec![0u64; n];
        for (slot, &v) in slots.iter_mut().zip(values) {
            *slot = self.ntt.to_mont(v);
        }
        self.ntt.inverse(&mut slots);

        Ok(Plaintext {
            poly: Poly::from_coeffs(slots, self.t),
        })
    }

    /// Encode one value into every slot
    pub fn encode_broadcast(&self, value: u64) -> Result<Plaintext> {
        self.encode(&vec![value; self.slot_count()])
    }

    /// Decode a plaintext to exactly `slot_count` values in [0, t)
    pub fn decode(&self, plaintext: &Plaintext) -> Vec<u64> {
        let mut values = plaintext.poly.coeffs().to_vec();
        self.ntt.forward(&mut values);
        for v in values.iter_mut() {
            *v = self.ntt.from_mont(*v);
        }
        values
    }
}
