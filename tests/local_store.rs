//! Local filesystem store persistence

use tempfile::TempDir;

use fhe_doc_search::store::{DocumentCache, KeyStore, LocalFileStore, MemoryStore, StorageError};
use fhe_doc_search::EncryptedDocument;

fn document(fingerprint: &str, batches: usize) -> EncryptedDocument {
    EncryptedDocument {
        fingerprint: fingerprint.to_string(),
        blobs: (0..batches).map(|i| vec![i as u8; 16 + i]).collect(),
        batch_width: 4,
        token_count: batches * 4 - 1,
        created_at: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn test_documents_persist_in_batch_order() {
    let temp_dir = TempDir::new().unwrap();
    let doc = document("abc123", 5);

    {
        let store = LocalFileStore::new(temp_dir.path()).await.unwrap();
        store.put_document(&doc).await.unwrap();
    }

    let store = LocalFileStore::new(temp_dir.path()).await.unwrap();
    let loaded = store.get_document("abc123").await.unwrap().unwrap();
    assert_eq!(loaded, doc);
    assert!(temp_dir.path().join("documents/abc123.bin").exists());
}

#[tokio::test]
async fn test_put_replaces_document() {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

    store.put_document(&document("doc", 2)).await.unwrap();
    store.put_document(&document("doc", 3)).await.unwrap();

    assert_eq!(store.get_document("doc").await.unwrap().unwrap().batch_count(), 3);
    assert_eq!(store.fingerprints().await.unwrap(), vec!["doc"]);
}

#[tokio::test]
async fn test_clearing_keys_keeps_documents() {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

    store.put("secret_key", b"sk").await.unwrap();
    store.put_document(&document("d1", 1)).await.unwrap();
    store.put_document(&document("d2", 1)).await.unwrap();

    store.clear().await.unwrap();
    assert!(store.names().await.unwrap().is_empty());
    assert_eq!(store.fingerprints().await.unwrap(), vec!["d1", "d2"]);

    store.clear_documents().await.unwrap();
    assert!(store.fingerprints().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backends_agree() {
    let temp_dir = TempDir::new().unwrap();
    let local = LocalFileStore::new(temp_dir.path()).await.unwrap();
    let memory = MemoryStore::new();

    for (name, blob) in [("public_key", b"pk".as_slice()), ("galois_keys", b"gk".as_slice())] {
        local.put(name, blob).await.unwrap();
        memory.put(name, blob).await.unwrap();
    }

    assert_eq!(local.names().await.unwrap(), memory.names().await.unwrap());
    assert_eq!(
        local.get("galois_keys").await.unwrap(),
        memory.get("galois_keys").await.unwrap()
    );
    assert_eq!(local.get("relin_keys").await.unwrap(), None);
    assert_eq!(memory.get("relin_keys").await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(temp_dir.path()).await.unwrap();

    for name in ["", "a/b", "..", "key.bin", "spaced name"] {
        assert!(
            matches!(store.get(name).await, Err(StorageError::InvalidName(_))),
            "{:?}",
            name
        );
    }
}
