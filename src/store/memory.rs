//! In-memory storage backend (for testing)

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{validate_name, StorageResult};
use super::traits::{DocumentCache, KeyStore};
use crate::search::document::EncryptedDocument;

/// In-memory key store and document cache
///
/// Thread-safe via `RwLock`. Not persistent; data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    keys: RwLock<BTreeMap<String, Vec<u8>>>,
    documents: RwLock<BTreeMap<String, EncryptedDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn get(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_name(name)?;
        Ok(self.keys.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, blob: &[u8]) -> StorageResult<()> {
        validate_name(name)?;
        self.keys
            .write()
            .await
            .insert(name.to_string(), blob.to_vec());
        Ok(())
    }

    async fn names(&self) -> StorageResult<Vec<String>> {
        Ok(self.keys.read().await.keys().cloned().collect())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.keys.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl DocumentCache for MemoryStore {
    async fn get_document(&self, fingerprint: &str) -> StorageResult<Option<EncryptedDocument>> {
        validate_name(fingerprint)?;
        Ok(self.documents.read().await.get(fingerprint).cloned())
    }

    async fn put_document(&self, document: &EncryptedDocument) -> StorageResult<()> {
        validate_name(&document.fingerprint)?;
        self.documents
            .write()
            .await
            .insert(document.fingerprint.clone(), document.clone());
        Ok(())
    }

    async fn fingerprints(&self) -> StorageResult<Vec<String>> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }

    async fn clear_documents(&self) -> StorageResult<()> {
        self.documents.write().await.clear();
        Ok(())
    }
}
