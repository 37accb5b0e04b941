//! One scheme context, one store and one engine behind a single handle

use tracing::{debug, info};

use crate::error::{Result, SearchError};
use crate::params::SchemeParams;
use crate::scheme::SchemeContext;
use crate::store::{DocumentCache, KeyStore};

use super::document::{join_pages, DocumentSource, EncryptedDocument};
use super::engine::{SearchEngine, SearchOptions, SearchResult};
use super::metrics::PerformanceMetrics;

/// Result of [`SearchSession::index_document`]
#[derive(Clone, Debug)]
pub struct IndexOutcome {
    pub document: EncryptedDocument,
    /// True when the document was served from the cache without encrypting
    pub from_cache: bool,
}

pub struct SearchSession<S> {
    context: SchemeContext,
    store: S,
    engine: SearchEngine,
}

impl<S: KeyStore + DocumentCache> SearchSession<S> {
    /// Initialize a context against `store` (loading or creating keys)
    pub async fn open(params: SchemeParams, store: S, options: SearchOptions) -> Result<Self> {
        let mut context = SchemeContext::new(params);
        context.initialize(&store).await?;
        Ok(Self {
            context,
            store,
            engine: SearchEngine::new(options),
        })
    }

    /// Discard every stored key and cached document, then open with a new key set
    ///
    /// Unlike [`open`](Self::open) followed by [`reset_keys`](Self::reset_keys),
    /// this never loads the existing keys, so it recovers a store whose key
    /// material is missing, corrupt or generated for other parameters.
    pub async fn open_fresh(params: SchemeParams, store: S, options: SearchOptions) -> Result<Self> {
        params.validate()?;
        store.clear_documents().await?;
        store.clear().await?;
        info!("stored keys and documents discarded");
        Self::open(params, store, options).await
    }

    /// Encrypt and cache `source`, or return the cached copy
    pub async fn index_document(
        &mut self,
        source: &dyn DocumentSource,
        progress: &mut dyn FnMut(f64),
    ) -> Result<IndexOutcome> {
        let fingerprint = source.fingerprint();
        if let Some(document) = self.store.get_document(&fingerprint).await? {
            debug!(%fingerprint, "document served from cache");
            return Ok(IndexOutcome {
                document,
                from_cache: true,
            });
        }

        let pages = source.extract_pages().await?;
        let text = join_pages(&pages);
        let document = self
            .engine
            .encrypt_text(&self.context, &fingerprint, &text, progress)?;
        self.store.put_document(&document).await?;

        info!(
            %fingerprint,
            pages = pages.len(),
            batches = document.batch_count(),
            "document indexed"
        );
        Ok(IndexOutcome {
            document,
            from_cache: false,
        })
    }

    /// Cached document by fingerprint
    pub async fn document(&self, fingerprint: &str) -> Result<EncryptedDocument> {
        self.store
            .get_document(fingerprint)
            .await?
            .ok_or_else(|| SearchError::DocumentNotFound(fingerprint.to_string()))
    }

    /// Search a cached document
    pub async fn search(
        &mut self,
        fingerprint: &str,
        query: &str,
        plaintext: Option<&str>,
        progress: &mut dyn FnMut(f64),
    ) -> Result<Vec<SearchResult>> {
        let document = self.document(fingerprint).await?;
        self.engine
            .search(&self.context, &document, query, plaintext, progress)
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.engine.metrics()
    }

    pub fn context(&self) -> &SchemeContext {
        &self.context
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the key set; cached documents are dropped with it
    pub async fn reset_keys(&mut self) -> Result<()> {
        self.store.clear_documents().await?;
        self.context.reset_keys(&self.store).await
    }

    /// Release key material; the store is handed back
    pub fn close(mut self) -> S {
        self.context.cleanup();
        self.store
    }
}
