//! Homomorphic token search over encrypted documents
//!
//! For every query token the broadcast code is encrypted once and subtracted
//! from each stored batch. A slot of the decrypted difference is zero exactly
//! where the stored code equals the query code, so match counting never
//! decrypts the document itself.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SearchError};
use crate::scheme::{deserialize_ciphertext, SchemeContext};

use super::document::{now_millis, EncryptedDocument};
use super::metrics::{MetricsRecorder, PerformanceMetrics};
use super::pipeline::{encrypt_batches, percent};
use super::tokenizer::{encode_text, hash_token, tokenize, tokenize_with_spans, Token};

/// Capability flags and limits of a [`SearchEngine`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Attach plaintext snippets around matched positions
    pub extract_context: bool,
    /// Record timings into [`PerformanceMetrics`]
    pub record_metrics: bool,
    /// Drop matches whose plaintext token differs from the query (hash collisions)
    pub verify_matches: bool,
    /// Positions reported per batch
    pub max_positions: usize,
    /// Tokens of context on each side of a match
    pub context_radius: usize,
    /// Tokens per ciphertext; `None` fills every slot
    pub batch_width: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            extract_context: false,
            record_metrics: true,
            verify_matches: false,
            max_positions: 5,
            context_radius: 5,
            batch_width: None,
        }
    }
}

impl SearchOptions {
    /// Snippets, metrics and collision filtering all enabled
    pub fn enhanced() -> Self {
        Self {
            extract_context: true,
            verify_matches: true,
            ..Self::default()
        }
    }
}

/// Matches of one query token within one batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub token: String,
    pub batch_index: usize,
    pub match_count: usize,
    /// First matched global token positions, ascending
    pub positions: Vec<usize>,
    /// Plaintext around each reported position
    pub snippets: Vec<String>,
}

/// Sum of match counts; a batch matching several tokens counts once per token
pub fn total_matches(results: &[SearchResult]) -> usize {
    results.iter().map(|r| r.match_count).sum()
}

#[derive(Debug, Default)]
pub struct SearchEngine {
    options: SearchOptions,
    metrics: MetricsRecorder,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    /// Tokens per batch under `ctx`
    pub fn batch_width(&self, ctx: &SchemeContext) -> Result<usize> {
        let slots = ctx.encoder()?.slot_count();
        match self.options.batch_width {
            None => Ok(slots),
            Some(w) if w >= 1 && w <= slots => Ok(w),
            Some(w) => Err(SearchError::Parameter(format!(
                "batch width {} outside 1..={}",
                w, slots
            ))),
        }
    }

    /// Tokenize, batch and encrypt `text` into a cacheable document
    pub fn encrypt_text(
        &mut self,
        ctx: &SchemeContext,
        fingerprint: &str,
        text: &str,
        progress: &mut dyn FnMut(f64),
    ) -> Result<EncryptedDocument> {
        let width = self.batch_width(ctx)?;
        let start = Instant::now();

        let (batches, token_count) = encode_text(text, width);
        let blobs = encrypt_batches(ctx, &batches, progress)?;

        if self.options.record_metrics {
            self.metrics.record_encryption(
                start.elapsed(),
                token_count,
                blobs.len(),
                ctx.encoder()?.slot_count(),
            );
        }
        info!(
            tokens = token_count,
            batches = blobs.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "encrypted document"
        );

        Ok(EncryptedDocument {
            fingerprint: fingerprint.to_string(),
            blobs,
            batch_width: width,
            token_count,
            created_at: now_millis(),
        })
    }

    /// Count encrypted matches of each query token in `document`
    ///
    /// `plaintext` is the text the document was encrypted from; it is only
    /// read for snippets and match verification. Results are ordered by
    /// query token, then batch index. Any undecryptable batch aborts the
    /// whole search.
    pub fn search(
        &mut self,
        ctx: &SchemeContext,
        document: &EncryptedDocument,
        query: &str,
        plaintext: Option<&str>,
        progress: &mut dyn FnMut(f64),
    ) -> Result<Vec<SearchResult>> {
        let params = ctx.params()?;
        let encoder = ctx.encoder()?;
        let encryptor = ctx.encryptor()?;
        let decryptor = ctx.decryptor()?;
        let evaluator = ctx.evaluator()?;
        let key_id = ctx.key_id()?;

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            debug!("query has no tokens");
            return Ok(Vec::new());
        }

        let width = document.batch_width;
        if width == 0 || width > encoder.slot_count() {
            return Err(SearchError::Parameter(format!(
                "document batch width {} outside 1..={}",
                width,
                encoder.slot_count()
            )));
        }

        let start = Instant::now();
        let spans = plaintext.map(|text| (text, tokenize_with_spans(text)));
        let batch_count = document.batch_count();
        let steps = query_tokens.len() * batch_count;
        let mut results = Vec::new();

        for (token_idx, token) in query_tokens.iter().enumerate() {
            let query_ct = encryptor.encrypt(&encoder.encode_broadcast(hash_token(token))?);

            for (batch_idx, blob) in document.blobs.iter().enumerate() {
                let stored = deserialize_ciphertext(blob, params, &key_id)?;
                let diff = evaluator.sub(&stored, &query_ct);
                let slots = encoder.decode(&decryptor.decrypt(&diff));

                let base = batch_idx * width;
                let mut positions: Vec<usize> = slots[..width]
                    .iter()
                    .enumerate()
                    .filter(|&(slot, &v)| v == 0 && base + slot < document.token_count)
                    .map(|(slot, _)| base + slot)
                    .collect();

                if self.options.verify_matches {
                    if let Some((_, tokens)) = &spans {
                        positions.retain(|&p| tokens.get(p).map_or(false, |t| &t.text == token));
                    }
                }

                if !positions.is_empty() {
                    let match_count = positions.len();
                    positions.truncate(self.options.max_positions);
                    let snippets = match (&spans, self.options.extract_context) {
                        (Some((text, tokens)), true) => positions
                            .iter()
                            .filter_map(|&p| snippet(text, tokens, p, self.options.context_radius))
                            .collect(),
                        _ => Vec::new(),
                    };
                    results.push(SearchResult {
                        token: token.clone(),
                        batch_index: batch_idx,
                        match_count,
                        positions,
                        snippets,
                    });
                }

                progress(percent(token_idx * batch_count + batch_idx + 1, steps));
            }
        }

        if self.options.record_metrics {
            self.metrics.record_search(
                start.elapsed(),
                document.token_count,
                batch_count,
                encoder.slot_count(),
            );
        }
        info!(
            query_tokens = query_tokens.len(),
            batches = batch_count,
            matches = total_matches(&results),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );

        Ok(results)
    }
}

/// Text from `radius` tokens before `position` to `radius` tokens after it
fn snippet(text: &str, tokens: &[Token], position: usize, radius: usize) -> Option<String> {
    let last = tokens.len().checked_sub(1)?;
    if position > last {
        return None;
    }
    let first = &tokens[position.saturating_sub(radius)];
    let end = &tokens[(position + radius).min(last)];
    text.get(first.span.start..end.span.end).map(str::to_string)
}
