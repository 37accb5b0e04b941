//! Scheme context: parameters, key set and engines behind one handle

use std::sync::Arc;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{Result, SearchError};
use crate::math::NttContext;
use crate::params::SchemeParams;
use crate::store::KeyStore;

use super::decryptor::Decryptor;
use super::encoder::BatchEncoder;
use super::encryptor::Encryptor;
use super::evaluator::Evaluator;
use super::keys::{KeyId, KeyMaterial, KeySet, GALOIS_KEYS, PUBLIC_KEY, RELIN_KEYS, SECRET_KEY};

/// Everything that exists only while the context is initialized
struct Engines {
    key_id: KeyId,
    encoder: BatchEncoder,
    encryptor: Encryptor,
    decryptor: Decryptor,
    evaluator: Evaluator,
}

/// Caller-owned scheme context
///
/// Starts uninitialized. [`initialize`](Self::initialize) loads or creates
/// the key set and builds the engines; until then every accessor fails with
/// `Uninitialized`. Independent contexts may coexist.
pub struct SchemeContext {
    params: SchemeParams,
    engines: Option<Engines>,
}

impl SchemeContext {
    pub fn new(params: SchemeParams) -> Self {
        Self {
            params,
            engines: None,
        }
    }

    /// Load the key set from `store`, generating and persisting a fresh one
    /// when no secret key is stored
    ///
    /// Idempotent. A stored secret key with missing, corrupt or mismatched
    /// companions fails with `KeyMaterial` and nothing is regenerated.
    pub async fn initialize<S: KeyStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        if self.engines.is_some() {
            return Ok(());
        }
        self.params.validate()?;

        let keys = match store.get(SECRET_KEY).await? {
            Some(secret_key) => {
                let material = load_material(store, Zeroizing::new(secret_key)).await?;
                let params = self.params.clone();
                let keys = tokio::task::spawn_blocking(move || {
                    KeySet::from_material(&params, &material)
                })
                .await
                .map_err(|e| SearchError::KeyMaterial(e.to_string()))??;
                info!(ring_dim = self.params.ring_dim, "loaded key set");
                keys
            }
            None => {
                info!(
                    ring_dim = self.params.ring_dim,
                    q_bits = self.params.coeff_modulus_bits(),
                    "generating key set"
                );
                let params = self.params.clone();
                let keys = tokio::task::spawn_blocking(move || KeySet::generate(&params))
                    .await
                    .map_err(|e| SearchError::KeyGeneration(e.to_string()))?;

                let material = keys.to_material()?;
                for (name, blob) in material.entries() {
                    store.put(name, blob).await?;
                }
                debug!("persisted key set");
                keys
            }
        };

        let engines = self.build_engines(keys)?;
        info!(key_id = %hex::encode(engines.key_id), "scheme context initialized");
        self.engines = Some(engines);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.engines.is_some()
    }

    /// Drop all key material and engines; the secret key is zeroized
    pub fn cleanup(&mut self) {
        if self.engines.take().is_some() {
            debug!("scheme context cleaned up");
        }
    }

    /// Discard the stored key set and initialize with a fresh one
    ///
    /// Ciphertexts produced under the old keys become undecryptable.
    pub async fn reset_keys<S: KeyStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.cleanup();
        store.clear().await?;
        info!("key store cleared");
        self.initialize(store).await
    }

    pub fn params(&self) -> Result<&SchemeParams> {
        self.engines()?;
        Ok(&self.params)
    }

    /// Configured parameters, available before initialization
    pub fn configured_params(&self) -> &SchemeParams {
        &self.params
    }

    pub fn key_id(&self) -> Result<KeyId> {
        Ok(self.engines()?.key_id)
    }

    pub fn encoder(&self) -> Result<&BatchEncoder> {
        Ok(&self.engines()?.encoder)
    }

    pub fn encryptor(&self) -> Result<&Encryptor> {
        Ok(&self.engines()?.encryptor)
    }

    pub fn decryptor(&self) -> Result<&Decryptor> {
        Ok(&self.engines()?.decryptor)
    }

    pub fn evaluator(&self) -> Result<&Evaluator> {
        Ok(&self.engines()?.evaluator)
    }

    fn engines(&self) -> Result<&Engines> {
        self.engines.as_ref().ok_or(SearchError::Uninitialized)
    }

    fn build_engines(&self, keys: KeySet) -> Result<Engines> {
        let params = &self.params;
        let ntt = Arc::new(NttContext::new(params.ring_dim, params.q));
        let key_id = keys.key_id()?;

        let engines = Engines {
            key_id,
            encoder: BatchEncoder::new(params),
            encryptor: Encryptor::new(keys.public_key.clone(), params, ntt.clone()),
            decryptor: Decryptor::new(&keys.secret_key, params, ntt.clone()),
            evaluator: Evaluator::new(keys.relin_keys.clone(), keys.galois_keys.clone(), ntt),
        };

        // Encrypting zero under the public key must decrypt to zero
        let zero = engines.encoder.encode(&[])?;
        let check = engines.decryptor.decrypt(&engines.encryptor.encrypt(&zero));
        if !check.poly().is_zero() {
            return Err(SearchError::KeyMaterial(
                "public key fails the encrypt-zero self-check".to_string(),
            ));
        }
        Ok(engines)
    }
}

impl std::fmt::Debug for SchemeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeContext")
            .field("params", &self.params)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

async fn load_material<S: KeyStore + ?Sized>(
    store: &S,
    secret_key: Zeroizing<Vec<u8>>,
) -> Result<KeyMaterial> {
    Ok(KeyMaterial {
        secret_key,
        public_key: require(store, PUBLIC_KEY).await?,
        relin_keys: require(store, RELIN_KEYS).await?,
        galois_keys: require(store, GALOIS_KEYS).await?,
    })
}

async fn require<S: KeyStore + ?Sized>(store: &S, name: &str) -> Result<Vec<u8>> {
    store.get(name).await?.ok_or_else(|| {
        SearchError::KeyMaterial(format!("{} is stored but {} is missing", SECRET_KEY, name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::keys::KEY_NAMES;
    use crate::store::MemoryStore;

    fn params() -> SchemeParams {
        SchemeParams::insecure_testing(256)
    }

    #[tokio::test]
    async fn test_accessors_fail_before_initialize() {
        let ctx = SchemeContext::new(params());
        assert!(!ctx.is_initialized());
        assert!(matches!(ctx.encoder(), Err(SearchError::Uninitialized)));
        assert!(matches!(ctx.encryptor(), Err(SearchError::Uninitialized)));
        assert!(matches!(ctx.decryptor(), Err(SearchError::Uninitialized)));
        assert!(matches!(ctx.evaluator(), Err(SearchError::Uninitialized)));
        assert!(matches!(ctx.key_id(), Err(SearchError::Uninitialized)));
        assert!(matches!(ctx.params(), Err(SearchError::Uninitialized)));
    }

    #[tokio::test]
    async fn test_initialize_generates_and_persists() {
        let store = MemoryStore::new();
        let mut ctx = SchemeContext::new(params());

        ctx.initialize(&store).await.unwrap();
        assert!(ctx.is_initialized());

        let mut expected: Vec<String> = KEY_NAMES.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(store.names().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = MemoryStore::new();
        let mut ctx = SchemeContext::new(params());

        ctx.initialize(&store).await.unwrap();
        let id = ctx.key_id().unwrap();
        ctx.initialize(&store).await.unwrap();
        assert_eq!(ctx.key_id().unwrap(), id);
    }

    #[tokio::test]
    async fn test_reload_keeps_key_id() {
        let store = MemoryStore::new();
        let mut first = SchemeContext::new(params());
        first.initialize(&store).await.unwrap();

        let mut second = SchemeContext::new(params());
        second.initialize(&store).await.unwrap();
        assert_eq!(first.key_id().unwrap(), second.key_id().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_params_leave_context_uninitialized() {
        let store = MemoryStore::new();
        let mut bad = params();
        bad.ring_dim = 100;
        let mut ctx = SchemeContext::new(bad);

        assert!(matches!(
            ctx.initialize(&store).await,
            Err(SearchError::Parameter(_))
        ));
        assert!(!ctx.is_initialized());
        assert!(store.names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_companion_blob_fails() {
        let store = MemoryStore::new();
        let mut ctx = SchemeContext::new(params());
        ctx.initialize(&store).await.unwrap();

        let sk = store.get(SECRET_KEY).await.unwrap().unwrap();
        let broken = MemoryStore::new();
        broken.put(SECRET_KEY, &sk).await.unwrap();

        let mut other = SchemeContext::new(params());
        assert!(matches!(
            other.initialize(&broken).await,
            Err(SearchError::KeyMaterial(_))
        ));
        assert!(!other.is_initialized());
        assert_eq!(broken.names().await.unwrap(), vec![SECRET_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let store = MemoryStore::new();
        let mut ctx = SchemeContext::new(params());
        ctx.initialize(&store).await.unwrap();

        ctx.cleanup();
        assert!(!ctx.is_initialized());
        ctx.cleanup();
        assert!(matches!(ctx.encoder(), Err(SearchError::Uninitialized)));
    }

    #[tokio::test]
    async fn test_reset_keys_replaces_key_set() {
        let store = MemoryStore::new();
        let mut ctx = SchemeContext::new(params());
        ctx.initialize(&store).await.unwrap();
        let old = ctx.key_id().unwrap();

        ctx.reset_keys(&store).await.unwrap();
        assert!(ctx.is_initialized());
        assert_ne!(ctx.key_id().unwrap(), old);
    }
}
