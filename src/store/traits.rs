//! Storage trait definitions

use async_trait::async_trait;

use super::error::StorageResult;
use crate::search::document::EncryptedDocument;

/// Named opaque blobs holding serialized key material
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Retrieve a blob, `None` when nothing is stored under `name`
    async fn get(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store a blob, replacing any previous value
    async fn put(&self, name: &str, blob: &[u8]) -> StorageResult<()>;

    /// Names of all stored blobs, sorted
    async fn names(&self) -> StorageResult<Vec<String>>;

    /// Remove every blob
    async fn clear(&self) -> StorageResult<()>;
}

/// Encrypted documents keyed by fingerprint
///
/// There is no expiry or eviction: entries live until cleared.
#[async_trait]
pub trait DocumentCache: Send + Sync {
    /// Retrieve a cached document
    async fn get_document(&self, fingerprint: &str) -> StorageResult<Option<EncryptedDocument>>;

    /// Store a document under its own fingerprint, replacing any previous entry
    async fn put_document(&self, document: &EncryptedDocument) -> StorageResult<()>;

    /// Fingerprints of all cached documents, sorted
    async fn fingerprints(&self) -> StorageResult<Vec<String>>;

    /// Remove every cached document
    async fn clear_documents(&self) -> StorageResult<()>;
}
