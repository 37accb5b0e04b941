//! Documents: plaintext sources and their encrypted, cacheable form

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Page separator in plain-text documents (form feed)
pub const PAGE_BREAK: char = '\x0c';

/// An encrypted document as persisted in the cache
///
/// `blobs[i]` encrypts token batch `i`; the order defines token positions
/// and must survive persistence unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDocument {
    /// Cache key, see [`fingerprint`]
    pub fingerprint: String,
    /// Serialized ciphertexts, one per token batch, in batch order
    pub blobs: Vec<Vec<u8>>,
    /// Tokens per batch (live slots per ciphertext)
    pub batch_width: usize,
    /// Number of tokens encrypted; slots past this are padding
    pub token_count: usize,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: u64,
}

impl EncryptedDocument {
    pub fn batch_count(&self) -> usize {
        self.blobs.len()
    }
}

/// Cache key for a document: hex blake3 of its name and byte size
pub fn fingerprint(name: &str, byte_size: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    hasher.update(&[0]);
    hasher.update(&byte_size.to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Producer of plain-text pages (PDF extraction, text files, ...)
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Stable identity used as the cache key
    fn fingerprint(&self) -> String;

    /// Plain UTF-8 text of every page, in page order
    async fn extract_pages(&self) -> Result<Vec<String>>;

    fn page_count(&self) -> usize;
}

/// Join extracted pages into the text that gets tokenized
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}

/// Plain-text document; pages are separated by form feeds
#[derive(Clone, Debug)]
pub struct TextDocument {
    name: String,
    text: String,
}

impl TextDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a UTF-8 file; the file name becomes the document name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(crate::store::StorageError::from)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn pages(&self) -> impl Iterator<Item = &str> {
        self.text.split(PAGE_BREAK)
    }
}

#[async_trait]
impl DocumentSource for TextDocument {
    fn fingerprint(&self) -> String {
        fingerprint(&self.name, self.text.len() as u64)
    }

    async fn extract_pages(&self) -> Result<Vec<String>> {
        Ok(self.pages().map(str::to_string).collect())
    }

    fn page_count(&self) -> usize {
        self.pages().count()
    }
}
