//! fhe-doc-search: keyword search over homomorphically encrypted documents
//!
//! Document text is tokenized, hashed to integer codes and packed into the
//! slots of a BFV-style batching scheme over R_q = Z_q[X]/(X^n + 1). A query
//! token is encrypted as a broadcast vector and subtracted from every stored
//! batch; decrypting the difference reveals which slots matched, never the
//! stored tokens.
//!
//! Layers, bottom up:
//! - [`math`]: modular arithmetic, NTT, polynomials, Gaussian sampling
//! - [`rlwe`]: RLWE keys, public-key encryption, Galois automorphisms
//! - [`ks`]: gadget decomposition and key switching
//! - [`scheme`]: batch encoding, scheme context, ciphertext blobs
//! - [`store`]: async key and document storage
//! - [`search`]: tokenizer, pipeline, search engine, sessions
//!
//! ```no_run
//! use fhe_doc_search::{SchemeParams, SearchOptions, SearchSession, TextDocument};
//! use fhe_doc_search::store::MemoryStore;
//!
//! # async fn run() -> fhe_doc_search::Result<()> {
//! let mut session =
//!     SearchSession::open(SchemeParams::default(), MemoryStore::new(), SearchOptions::default())
//!         .await?;
//! let doc = TextDocument::new("notes.txt", "alpha beta alpha gamma");
//! let indexed = session.index_document(&doc, &mut |_| {}).await?;
//! let results = session
//!     .search(&indexed.document.fingerprint, "alpha", None, &mut |_| {})
//!     .await?;
//! assert_eq!(fhe_doc_search::total_matches(&results), 2);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ks;
pub mod math;
pub mod params;
pub mod rlwe;
pub mod scheme;
pub mod search;
pub mod store;

pub use error::{Result, SearchError};
pub use params::{SchemeParams, SecurityLevel};
pub use scheme::SchemeContext;
pub use search::{
    total_matches, DocumentSource, EncryptedDocument, PerformanceMetrics, SearchEngine,
    SearchOptions, SearchResult, SearchSession, TextDocument,
};
