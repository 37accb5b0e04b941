//! Secret-key decryption and noise inspection

use std::sync::Arc;

use crate::math::{ModQ, NttContext};
use crate::params::SchemeParams;
use crate::rlwe::{RlweCiphertext, RlweSecretKey};

use super::encoder::Plaintext;

/// Decrypts ciphertexts with the context's secret key
///
/// The key is held in NTT form; it is zeroized when the decryptor drops.
pub struct Decryptor {
    secret_key: RlweSecretKey,
    t: u64,
    delta: u64,
    ntt: Arc<NttContext>,
}

impl Decryptor {
    pub fn new(secret_key: &RlweSecretKey, params: &SchemeParams, ntt: Arc<NttContext>) -> Self {
        let secret_key = RlweSecretKey::from_poly(secret_key.poly.to_ntt_new(&ntt));
        Self {
            secret_key,
            t: params.t,
            delta: params.delta(),
            ntt,
        }
    }

    pub fn decrypt(&self, ciphertext: &RlweCiphertext) -> Plaintext {
        Plaintext::from_poly(ciphertext.decrypt(&self.secret_key, self.t, &self.ntt))
    }

    /// Remaining noise budget in bits, 0 once decryption is no longer reliable
    ///
    /// Measured as log2(Δ/2) - log2(‖e‖∞), where e is the distance of the
    /// phase from the nearest multiple of Δ.
    pub fn invariant_noise_budget(&self, ciphertext: &RlweCiphertext) -> u32 {
        let phase = ciphertext.phase(&self.secret_key, &self.ntt);
        let q = phase.modulus();
        let plain = ciphertext.decrypt(&self.secret_key, self.t, &self.ntt);

        let noise = phase
            .coeffs()
            .iter()
            .zip(plain.coeffs())
            .map(|(&v, &m)| {
                let scaled = ModQ::mul(m, self.delta, q);
                ModQ::to_signed(ModQ::sub(v, scaled, q), q).unsigned_abs()
            })
            .max()
            .unwrap_or(0);

        let limit = bit_length(self.delta / 2);
        limit.saturating_sub(bit_length(noise))
    }
}

impl std::fmt::Debug for Decryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decryptor")
            .field("ring_dim", &self.secret_key.ring_dim())
            .field("t", &self.t)
            .finish_non_exhaustive()
    }
}

fn bit_length(x: u64) -> u32 {
    64 - x.leading_zeros()
}
