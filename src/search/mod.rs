//! Encrypted token search
//!
//! ```text
//! DocumentSource ─pages─▶ tokenizer ─batches─▶ pipeline ─blobs─▶ DocumentCache
//!                                                                   │
//!                              query ─▶ SearchEngine ◀──────────────┘
//! ```
//!
//! [`SearchSession`] wires a scheme context, a store and an engine
//! together; the lower layers can also be driven directly.

pub mod document;
pub mod engine;
pub mod metrics;
pub mod pipeline;
pub mod session;
pub mod tokenizer;

pub use document::{DocumentSource, EncryptedDocument, TextDocument};
pub use engine::{total_matches, SearchEngine, SearchOptions, SearchResult};
pub use metrics::{MetricsRecorder, PerformanceMetrics};
pub use pipeline::{decrypt_batches, encrypt_batches};
pub use session::{IndexOutcome, SearchSession};
pub use tokenizer::{batch, encode_text, hash_token, tokenize, tokenize_with_spans, TokenBatch};
