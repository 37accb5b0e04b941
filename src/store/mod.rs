//! Async blob storage for key material and cached encrypted documents
//!
//! ## Backends
//!
//! | Backend          | Use Case                 |
//! |------------------|--------------------------|
//! | `MemoryStore`    | Unit tests               |
//! | `LocalFileStore` | CLI, integration tests   |

mod error;
mod local;
mod memory;
mod traits;

pub use error::{validate_name, StorageError, StorageResult};
pub use local::LocalFileStore;
pub use memory::MemoryStore;
pub use traits::{DocumentCache, KeyStore};
