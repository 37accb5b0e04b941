//! Public-key encryption of batched plaintexts

use std::sync::Arc;

use crate::math::{GaussianSampler, NttContext};
use crate::params::SchemeParams;
use crate::rlwe::{RlweCiphertext, RlwePublicKey};

use super::encoder::Plaintext;

/// Encrypts plaintexts under the context's public key
///
/// Each call draws fresh randomness from OS entropy, so encrypting the same
/// plaintext twice yields different ciphertexts.
#[derive(Clone, Debug)]
pub struct Encryptor {
    public_key: RlwePublicKey,
    delta: u64,
    q: u64,
    sigma: f64,
    ntt: Arc<NttContext>,
}

impl Encryptor {
    pub fn new(public_key: RlwePublicKey, params: &SchemeParams, ntt: Arc<NttContext>) -> Self {
        Self {
            public_key,
            delta: params.delta(),
            q: params.q,
            sigma: params.sigma,
            ntt,
        }
    }

    pub fn encrypt(&self, plaintext: &Plaintext) -> RlweCiphertext {
        let mut sampler = GaussianSampler::new(self.sigma);
        self.encrypt_with_sampler(plaintext, &mut sampler)
    }

    /// Encrypt with caller-supplied randomness
    pub fn encrypt_with_sampler(
        &self,
        plaintext: &Plaintext,
        sampler: &mut GaussianSampler,
    ) -> RlweCiphertext {
        let message = plaintext.lift(self.q);
        RlweCiphertext::encrypt_public(&self.public_key, &message, self.delta, sampler, &self.ntt)
    }
}
