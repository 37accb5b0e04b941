//! End-to-end search tests
//!
//! Index → Encrypt → Search → Match counts agree with plaintext occurrences

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use fhe_doc_search::search::{decrypt_batches, encode_text, encrypt_batches, hash_token, tokenize};
use fhe_doc_search::store::MemoryStore;
use fhe_doc_search::{
    total_matches, DocumentSource, SchemeContext, SchemeParams, SearchEngine, SearchError,
    SearchOptions, SearchSession, TextDocument,
};

fn test_params() -> SchemeParams {
    SchemeParams::insecure_testing(256)
}

fn options(width: usize) -> SearchOptions {
    SearchOptions {
        batch_width: Some(width),
        ..SearchOptions::default()
    }
}

async fn test_context() -> SchemeContext {
    let mut ctx = SchemeContext::new(test_params());
    ctx.initialize(&MemoryStore::new()).await.unwrap();
    ctx
}

/// Counts page extractions so cache hits are observable
struct CountingSource {
    inner: TextDocument,
    extractions: AtomicUsize,
}

#[async_trait]
impl DocumentSource for CountingSource {
    fn fingerprint(&self) -> String {
        self.inner.fingerprint()
    }

    async fn extract_pages(&self) -> fhe_doc_search::Result<Vec<String>> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        self.inner.extract_pages().await
    }

    fn page_count(&self) -> usize {
        self.inner.page_count()
    }
}

#[tokio::test]
async fn test_roundtrip_recovers_codes() {
    let ctx = test_context().await;
    let text = "It was the best of times, it was the worst of times; \
                it was the age of wisdom, it was the age of foolishness.";
    let (batches, token_count) = encode_text(text, 8);
    assert_eq!(batches.len(), (token_count + 7) / 8);

    let blobs = encrypt_batches(&ctx, &batches, &mut |_| {}).unwrap();
    let decoded = decrypt_batches(&ctx, &blobs).unwrap();

    let expected: Vec<u64> = tokenize(text).iter().map(|t| hash_token(t)).collect();
    let recovered: Vec<u64> = decoded.iter().flat_map(|v| v[..8].to_vec()).collect();
    assert_eq!(&recovered[..token_count], expected.as_slice());
    assert!(recovered[token_count..].iter().all(|&c| c == 0));
}

#[tokio::test]
async fn test_alpha_beta_gamma_scenario() {
    let ctx = test_context().await;
    let mut engine = SearchEngine::new(options(2));
    let doc = engine
        .encrypt_text(&ctx, "abc", "alpha beta alpha gamma", &mut |_| {})
        .unwrap();
    assert_eq!(doc.batch_count(), 2);

    let results = engine.search(&ctx, &doc, "alpha", None, &mut |_| {}).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].batch_index, 0);
    assert_eq!(results[0].positions, vec![0]);
    assert_eq!(results[0].match_count, 1);
    assert_eq!(results[1].batch_index, 1);
    assert_eq!(results[1].positions, vec![2]);
    assert_eq!(results[1].match_count, 1);
    assert_eq!(total_matches(&results), 2);
}

#[tokio::test]
async fn test_exact_match_and_absent_token() {
    let ctx = test_context().await;
    let mut engine = SearchEngine::new(SearchOptions::default());
    let text = "Homomorphic encryption lets the server compute on data it cannot read";
    let doc = engine.encrypt_text(&ctx, "doc", text, &mut |_| {}).unwrap();

    let hit = engine.search(&ctx, &doc, "SERVER", None, &mut |_| {}).unwrap();
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].positions, vec![4]);

    let miss = engine.search(&ctx, &doc, "client", None, &mut |_| {}).unwrap();
    assert!(miss.is_empty());
}

#[tokio::test]
async fn test_no_false_negatives_across_batches() {
    let ctx = test_context().await;
    let mut engine = SearchEngine::new(options(3));

    let mut documents = Vec::new();
    for i in 0..4 {
        let filler: Vec<String> = (0..7).map(|j| format!("filler{}", j)).collect();
        let mut words = filler.clone();
        words.insert(2 * i + 1, format!("marker{}", i));
        let text = words.join(" ");
        documents.push(
            engine
                .encrypt_text(&ctx, &format!("doc{}", i), &text, &mut |_| {})
                .unwrap(),
        );
    }

    for (i, doc) in documents.iter().enumerate() {
        assert_eq!(doc.batch_count(), 3);
        for (j, other) in documents.iter().enumerate() {
            let results = engine
                .search(&ctx, other, &format!("marker{}", i), None, &mut |_| {})
                .unwrap();
            if i == j {
                assert_eq!(total_matches(&results), 1, "marker{} in doc{}", i, j);
                assert_eq!(results[0].positions, vec![2 * i + 1]);
                assert_eq!(results[0].batch_index, (2 * i + 1) / 3);
            } else {
                assert!(results.is_empty(), "marker{} leaked into doc{}", i, j);
            }
        }
    }
}

#[tokio::test]
async fn test_multi_token_query_is_not_deduplicated() {
    let ctx = test_context().await;
    let mut engine = SearchEngine::new(options(2));
    let doc = engine
        .encrypt_text(&ctx, "doc", "red green blue red blue", &mut |_| {})
        .unwrap();

    let results = engine.search(&ctx, &doc, "blue red", None, &mut |_| {}).unwrap();

    let summary: Vec<(&str, usize, usize)> = results
        .iter()
        .map(|r| (r.token.as_str(), r.batch_index, r.match_count))
        .collect();
    assert_eq!(
        summary,
        vec![("blue", 1, 1), ("blue", 2, 1), ("red", 0, 1), ("red", 1, 1)]
    );
    assert_eq!(total_matches(&results), 4);
}

#[tokio::test]
async fn test_empty_query() {
    let ctx = test_context().await;
    let mut engine = SearchEngine::new(SearchOptions::default());
    let doc = engine.encrypt_text(&ctx, "doc", "anything", &mut |_| {}).unwrap();

    assert!(engine.search(&ctx, &doc, "", None, &mut |_| {}).unwrap().is_empty());
    assert!(engine.search(&ctx, &doc, " ;:- ", None, &mut |_| {}).unwrap().is_empty());
}

#[tokio::test]
async fn test_search_before_initialize() {
    let ready = test_context().await;
    let mut engine = SearchEngine::new(SearchOptions::default());
    let doc = engine.encrypt_text(&ready, "doc", "text", &mut |_| {}).unwrap();

    let fresh = SchemeContext::new(test_params());
    assert!(matches!(
        engine.search(&fresh, &doc, "text", None, &mut |_| {}),
        Err(SearchError::Uninitialized)
    ));
}

#[tokio::test]
async fn test_document_from_other_context_fails() {
    let a = test_context().await;
    let b = test_context().await;
    let mut engine = SearchEngine::new(SearchOptions::default());
    let doc = engine.encrypt_text(&a, "doc", "shared words", &mut |_| {}).unwrap();

    assert!(matches!(
        engine.search(&b, &doc, "shared", None, &mut |_| {}),
        Err(SearchError::Deserialization(_))
    ));
}

#[tokio::test]
async fn test_session_cache_idempotence() {
    let mut session = SearchSession::open(test_params(), MemoryStore::new(), options(4))
        .await
        .unwrap();
    let source = CountingSource {
        inner: TextDocument::new("report.txt", "page one text\x0cpage two text"),
        extractions: AtomicUsize::new(0),
    };

    let mut first_progress = 0;
    let first = session
        .index_document(&source, &mut |_| first_progress += 1)
        .await
        .unwrap();
    assert!(!first.from_cache);
    assert_eq!(first_progress, 2);

    let mut second_progress = 0;
    let second = session
        .index_document(&source, &mut |_| second_progress += 1)
        .await
        .unwrap();
    assert!(second.from_cache);
    assert_eq!(second_progress, 0);
    assert_eq!(source.extractions.load(Ordering::SeqCst), 1);
    assert_eq!(second.document.blobs, first.document.blobs);
    assert_eq!(session.store().document_count().await, 1);

    let results = session
        .search(&first.document.fingerprint, "text", None, &mut |_| {})
        .await
        .unwrap();
    assert_eq!(total_matches(&results), 2);
}

#[tokio::test]
async fn test_session_unknown_document() {
    let mut session = SearchSession::open(test_params(), MemoryStore::new(), SearchOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        session.search("0123abcd", "word", None, &mut |_| {}).await,
        Err(SearchError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn test_session_snippets_across_pages() {
    let mut session = SearchSession::open(
        test_params(),
        MemoryStore::new(),
        SearchOptions {
            context_radius: 1,
            ..SearchOptions::enhanced()
        },
    )
    .await
    .unwrap();
    let doc = TextDocument::new("book.txt", "Chapter one ends\x0cChapter two begins");
    let outcome = session.index_document(&doc, &mut |_| {}).await.unwrap();
    let text = "Chapter one ends\nChapter two begins";

    let results = session
        .search(&outcome.document.fingerprint, "chapter", Some(text), &mut |_| {})
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].positions, vec![0, 3]);
    assert_eq!(results[0].snippets, vec!["Chapter one", "ends\nChapter two"]);
    assert!(session.metrics().search_time_ms > 0.0);
}
