//! Key set generation, persistence and consistency checks

use std::collections::BTreeMap;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Result, SearchError};
use crate::ks::{
    generate_automorphism_ks_matrix, generate_relin_matrix, key_switch_poly, GadgetVector,
    KeySwitchingMatrix,
};
use crate::math::{GaussianSampler, ModQ, NttContext, Poly};
use crate::params::SchemeParams;
use crate::rlwe::{
    apply_automorphism, galois_elements, RlweCiphertext, RlwePublicKey, RlweSecretKey,
};

/// Store name of the secret key blob
pub const SECRET_KEY: &str = "secret_key";
/// Store name of the public key blob
pub const PUBLIC_KEY: &str = "public_key";
/// Store name of the relinearization key blob
pub const RELIN_KEYS: &str = "relin_keys";
/// Store name of the Galois (rotation) key blob
pub const GALOIS_KEYS: &str = "galois_keys";

/// All four key blob names, secret key first
pub const KEY_NAMES: [&str; 4] = [SECRET_KEY, PUBLIC_KEY, RELIN_KEYS, GALOIS_KEYS];

/// Length of the key id embedded in every ciphertext blob
pub const KEY_ID_LEN: usize = 16;

/// Identifies the key set a ciphertext was produced under
pub type KeyId = [u8; KEY_ID_LEN];

/// Relinearization key: switches s² back to s
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinKeys(pub KeySwitchingMatrix);

/// Rotation keys indexed by Galois element: each switches τ_g(s) back to s
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaloisKeys(pub BTreeMap<usize, KeySwitchingMatrix>);

impl GaloisKeys {
    pub fn get(&self, g: usize) -> Option<&KeySwitchingMatrix> {
        self.0.get(&g)
    }

    pub fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }
}

/// Serialized key material, one blob per store name
pub struct KeyMaterial {
    pub secret_key: Zeroizing<Vec<u8>>,
    pub public_key: Vec<u8>,
    pub relin_keys: Vec<u8>,
    pub galois_keys: Vec<u8>,
}

impl KeyMaterial {
    /// (name, blob) pairs in persistence order
    pub fn entries(&self) -> [(&'static str, &[u8]); 4] {
        [
            (SECRET_KEY, self.secret_key.as_slice()),
            (PUBLIC_KEY, self.public_key.as_slice()),
            (RELIN_KEYS, self.relin_keys.as_slice()),
            (GALOIS_KEYS, self.galois_keys.as_slice()),
        ]
    }
}

/// Full key set of one scheme context
#[derive(Clone, Debug)]
pub struct KeySet {
    pub secret_key: RlweSecretKey,
    pub public_key: RlwePublicKey,
    pub relin_keys: RelinKeys,
    pub galois_keys: GaloisKeys,
}

impl KeySet {
    /// Generate a fresh key set from OS entropy
    ///
    /// Galois keys are generated in parallel, each from its own seed drawn
    /// from the main stream.
    pub fn generate(params: &SchemeParams) -> Self {
        Self::generate_with_sampler(params, &mut GaussianSampler::new(params.sigma))
    }

    /// Generate a key set from the given sampler
    pub fn generate_with_sampler(params: &SchemeParams, sampler: &mut GaussianSampler) -> Self {
        let ctx = NttContext::new(params.ring_dim, params.q);
        let gadget = gadget(params);

        let secret_key = RlweSecretKey::generate(params, sampler);
        let public_key = RlwePublicKey::generate(&secret_key, params, sampler, &ctx);
        let relin_keys = RelinKeys(generate_relin_matrix(&secret_key, &gadget, sampler, &ctx));

        let seeded: Vec<(usize, [u8; 32])> = galois_elements(params.ring_dim)
            .into_iter()
            .map(|g| (g, sampler.rng_mut().gen()))
            .collect();

        let galois_keys = GaloisKeys(
            seeded
                .into_par_iter()
                .map(|(g, seed)| {
                    let mut sampler = GaussianSampler::from_seed(params.sigma, seed);
                    let matrix = generate_automorphism_ks_matrix(
                        &secret_key,
                        g,
                        &gadget,
                        &mut sampler,
                        &ctx,
                    );
                    (g, matrix)
                })
                .collect(),
        );

        debug!(
            ring_dim = params.ring_dim,
            galois_keys = galois_keys.0.len(),
            "generated key set"
        );

        Self {
            secret_key,
            public_key,
            relin_keys,
            galois_keys,
        }
    }

    /// Serialize every key to its store blob
    pub fn to_material(&self) -> Result<KeyMaterial> {
        Ok(KeyMaterial {
            secret_key: Zeroizing::new(encode(&self.secret_key)?),
            public_key: encode(&self.public_key)?,
            relin_keys: encode(&self.relin_keys)?,
            galois_keys: encode(&self.galois_keys)?,
        })
    }

    /// Decode and validate persisted key material against `params`
    ///
    /// Fails with `KeyMaterial` if a blob is corrupt, shaped for other
    /// parameters, or does not belong to the same secret key.
    pub fn from_material(params: &SchemeParams, material: &KeyMaterial) -> Result<Self> {
        let keys = Self {
            secret_key: decode(SECRET_KEY, &material.secret_key)?,
            public_key: decode(PUBLIC_KEY, &material.public_key)?,
            relin_keys: decode(RELIN_KEYS, &material.relin_keys)?,
            galois_keys: decode(GALOIS_KEYS, &material.galois_keys)?,
        };
        keys.check_shape(params)?;
        keys.check_consistency(params)?;
        Ok(keys)
    }

    /// 16-byte id: leading bytes of blake3 over the public key blob
    pub fn key_id(&self) -> Result<KeyId> {
        let blob = bincode::serialize(&self.public_key)
            .map_err(|e| SearchError::KeyMaterial(format!("{}: {}", PUBLIC_KEY, e)))?;
        let hash = blake3::hash(&blob);
        let mut id = [0u8; KEY_ID_LEN];
        id.copy_from_slice(&hash.as_bytes()[..KEY_ID_LEN]);
        Ok(id)
    }

    fn check_shape(&self, params: &SchemeParams) -> Result<()> {
        let (n, q) = (params.ring_dim, params.q);
        let poly_ok = |p: &Poly| {
            p.dimension() == n && p.modulus() == q && p.coeffs().iter().all(|&c| c < q)
        };

        if !poly_ok(&self.secret_key.poly) || self.secret_key.poly.is_ntt() {
            return Err(mismatch(SECRET_KEY));
        }
        if !poly_ok(&self.public_key.a)
            || !poly_ok(&self.public_key.b)
            || self.public_key.a.is_ntt()
            || self.public_key.b.is_ntt()
        {
            return Err(mismatch(PUBLIC_KEY));
        }
        if self.relin_keys.0.gadget != gadget(params) || !self.relin_keys.0.is_well_formed(n, q) {
            return Err(mismatch(RELIN_KEYS));
        }

        let expected: Vec<usize> = galois_elements(n);
        let present: Vec<usize> = self.galois_keys.elements().collect();
        if present != sorted(expected)
            || self
                .galois_keys
                .0
                .values()
                .any(|m| m.gadget != gadget(params) || !m.is_well_formed(n, q))
        {
            return Err(mismatch(GALOIS_KEYS));
        }
        Ok(())
    }

    /// Every public key must belong to the secret key: the public key
    /// decrypts to small noise, and each switching matrix maps its source
    /// key to s with small noise.
    fn check_consistency(&self, params: &SchemeParams) -> Result<()> {
        let ctx = NttContext::new(params.ring_dim, params.q);
        let sk = &self.secret_key;
        let bound = params.delta() / 4;

        let pk_ct =
            RlweCiphertext::from_parts(self.public_key.a.clone(), self.public_key.b.clone());
        if pk_ct.phase(sk, &ctx).linf_norm() >= bound {
            return Err(SearchError::KeyMaterial(format!(
                "{} does not belong to {}",
                PUBLIC_KEY, SECRET_KEY
            )));
        }

        let s_squared = RlweSecretKey::from_poly(sk.poly.mul_ntt(&sk.poly, &ctx));
        if !switches_to(&self.relin_keys.0, &s_squared.poly, sk, bound, &ctx) {
            return Err(SearchError::KeyMaterial(format!(
                "{} does not belong to {}",
                RELIN_KEYS, SECRET_KEY
            )));
        }

        for (&g, matrix) in &self.galois_keys.0 {
            let auto_s = RlweSecretKey::from_poly(apply_automorphism(&sk.poly, g));
            if !switches_to(matrix, &auto_s.poly, sk, bound, &ctx) {
                return Err(SearchError::KeyMaterial(format!(
                    "{} entry {} does not belong to {}",
                    GALOIS_KEYS, g, SECRET_KEY
                )));
            }
        }
        Ok(())
    }
}

/// Gadget used for all switching keys under `params`
pub fn gadget(params: &SchemeParams) -> GadgetVector {
    GadgetVector::from_params(params)
}

/// Switch the constant polynomial 1 (times `from`) and compare against `from`
fn switches_to(
    matrix: &KeySwitchingMatrix,
    from: &Poly,
    sk: &RlweSecretKey,
    bound: u64,
    ctx: &NttContext,
) -> bool {
    let one = Poly::constant(1, from.dimension(), from.modulus());
    let switched = key_switch_poly(&one, matrix, ctx);
    let noise = &switched.phase(sk, ctx) - from;
    noise
        .coeffs()
        .iter()
        .all(|&c| ModQ::to_signed(c, from.modulus()).unsigned_abs() < bound)
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

fn mismatch(name: &str) -> SearchError {
    SearchError::KeyMaterial(format!("{} does not match the scheme parameters", name))
}

fn decode<T: serde::de::DeserializeOwned>(name: &str, blob: &[u8]) -> Result<T> {
    bincode::deserialize(blob).map_err(|e| SearchError::KeyMaterial(format!("{}: {}", name, e)))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| SearchError::KeyGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> SchemeParams {
        SchemeParams::insecure_testing(256)
    }

    fn test_keys(seed: u64) -> KeySet {
        let params = test_params();
        KeySet::generate_with_sampler(&params, &mut GaussianSampler::with_seed(params.sigma, seed))
    }

    #[test]
    fn test_material_roundtrip() {
        let params = test_params();
        let keys = test_keys(1);

        let material = keys.to_material().unwrap();
        let loaded = KeySet::from_material(&params, &material).unwrap();

        assert_eq!(loaded.public_key, keys.public_key);
        assert_eq!(loaded.secret_key.poly, keys.secret_key.poly);
        assert_eq!(loaded.key_id().unwrap(), keys.key_id().unwrap());
    }

    #[test]
    fn test_galois_elements_covered() {
        let keys = test_keys(2);
        let mut expected = galois_elements(256);
        expected.sort_unstable();
        assert_eq!(keys.galois_keys.elements().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_key_ids_differ_between_key_sets() {
        assert_ne!(test_keys(3).key_id().unwrap(), test_keys(4).key_id().unwrap());
    }

    #[test]
    fn test_mixed_key_sets_rejected() {
        let params = test_params();
        let a = test_keys(5).to_material().unwrap();
        let b = test_keys(6).to_material().unwrap();

        let swapped_pk = KeyMaterial {
            secret_key: a.secret_key.clone(),
            public_key: b.public_key.clone(),
            relin_keys: a.relin_keys.clone(),
            galois_keys: a.galois_keys.clone(),
        };
        assert!(matches!(
            KeySet::from_material(&params, &swapped_pk),
            Err(SearchError::KeyMaterial(_))
        ));

        let swapped_relin = KeyMaterial {
            secret_key: a.secret_key.clone(),
            public_key: a.public_key.clone(),
            relin_keys: b.relin_keys.clone(),
            galois_keys: a.galois_keys.clone(),
        };
        assert!(matches!(
            KeySet::from_material(&params, &swapped_relin),
            Err(SearchError::KeyMaterial(_))
        ));
    }

    #[test]
    fn test_corrupt_blob_rejected() {
        let params = test_params();
        let mut material = test_keys(7).to_material().unwrap();
        material.galois_keys.truncate(10);

        assert!(matches!(
            KeySet::from_material(&params, &material),
            Err(SearchError::KeyMaterial(_))
        ));
    }

    #[test]
    fn test_foreign_parameters_rejected() {
        let material = test_keys(8).to_material().unwrap();
        let other = SchemeParams::insecure_testing(512);

        assert!(matches!(
            KeySet::from_material(&other, &material),
            Err(SearchError::KeyMaterial(_))
        ));
    }
}
