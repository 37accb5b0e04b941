//! Error types for scheme and search operations

use crate::store::StorageError;
use thiserror::Error;

/// Errors surfaced by the scheme context, pipeline and search engine.
///
/// No operation retries internally and none returns partial results: a
/// failed call leaves the context untouched and reports one of these.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid scheme parameters: {0}")]
    Parameter(String),

    #[error("Scheme context is not initialized")]
    Uninitialized,

    #[error("Ciphertext deserialization failed: {0}")]
    Deserialization(String),

    #[error("Key material unusable: {0}")]
    KeyMaterial(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("No Galois key for element {0}")]
    MissingGaloisKey(usize),

    #[error("Document not found in cache: {0}")]
    DocumentNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
