//! Local filesystem storage backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::{validate_name, StorageResult};
use super::traits::{DocumentCache, KeyStore};
use crate::search::document::EncryptedDocument;

const KEYS_DIR: &str = "keys";
const DOCUMENTS_DIR: &str = "documents";
const EXTENSION: &str = "bin";

/// Local filesystem storage
///
/// Structure:
/// - `{root}/keys/{name}.bin` raw key blobs
/// - `{root}/documents/{fingerprint}.bin` bincode-encoded documents
///
/// Writes go to a temporary file first and are renamed into place.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create storage at the given root directory
    ///
    /// Creates the directory structure if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(KEYS_DIR)).await?;
        fs::create_dir_all(root.join(DOCUMENTS_DIR)).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, dir: &str, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(dir).join(format!("{}.{}", name, EXTENSION)))
    }

    async fn read_entry(&self, dir: &str, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.entry_path(dir, name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entry(&self, dir: &str, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.entry_path(dir, name)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn list_entries(&self, dir: &str) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(self.root.join(dir)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn clear_dir(&self, dir: &str) -> StorageResult<()> {
        for name in self.list_entries(dir).await? {
            let path = self.entry_path(dir, &name)?;
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for LocalFileStore {
    async fn get(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        self.read_entry(KEYS_DIR, name).await
    }

    async fn put(&self, name: &str, blob: &[u8]) -> StorageResult<()> {
        self.write_entry(KEYS_DIR, name, blob).await
    }

    async fn names(&self) -> StorageResult<Vec<String>> {
        self.list_entries(KEYS_DIR).await
    }

    async fn clear(&self) -> StorageResult<()> {
        self.clear_dir(KEYS_DIR).await
    }
}

#[async_trait]
impl DocumentCache for LocalFileStore {
    async fn get_document(&self, fingerprint: &str) -> StorageResult<Option<EncryptedDocument>> {
        match self.read_entry(DOCUMENTS_DIR, fingerprint).await? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_document(&self, document: &EncryptedDocument) -> StorageResult<()> {
        let bytes = bincode::serialize(document)?;
        self.write_entry(DOCUMENTS_DIR, &document.fingerprint, &bytes)
            .await
    }

    async fn fingerprints(&self) -> StorageResult<Vec<String>> {
        self.list_entries(DOCUMENTS_DIR).await
    }

    async fn clear_documents(&self) -> StorageResult<()> {
        self.clear_dir(DOCUMENTS_DIR).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_key_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

        assert_eq!(store.get("secret_key").await.unwrap(), None);
        store.put("secret_key", b"key bytes").await.unwrap();
        assert_eq!(
            store.get("secret_key").await.unwrap(),
            Some(b"key bytes".to_vec())
        );
        assert!(temp_dir.path().join("keys/secret_key.bin").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

        let result = store.put("../outside", b"x").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_names_ignore_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

        store.put("public_key", b"p").await.unwrap();
        store.put("galois_keys", b"g").await.unwrap();
        std::fs::write(temp_dir.path().join("keys/notes.txt"), b"x").unwrap();

        assert_eq!(store.names().await.unwrap(), vec!["galois_keys", "public_key"]);

        store.clear().await.unwrap();
        assert!(store.names().await.unwrap().is_empty());
        assert!(temp_dir.path().join("keys/notes.txt").exists());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_codec_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

        std::fs::write(temp_dir.path().join("documents/broken.bin"), b"\x01").unwrap();
        let result = store.get_document("broken").await;
        assert!(matches!(result, Err(StorageError::Codec(_))));
    }
}
