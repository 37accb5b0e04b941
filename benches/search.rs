use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fhe_doc_search::store::MemoryStore;
use fhe_doc_search::{SchemeContext, SchemeParams, SearchEngine, SearchOptions};

fn document_text(tokens: usize) -> String {
    (0..tokens)
        .map(|i| format!("word{}", i % 997))
        .collect::<Vec<_>>()
        .join(" ")
}

fn search_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let params = SchemeParams::bfv_4096();
    let mut ctx = SchemeContext::new(params.clone());
    runtime
        .block_on(ctx.initialize(&MemoryStore::new()))
        .unwrap();

    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for batches in [1usize, 4, 16] {
        let text = document_text(batches * params.slot_count());
        let mut engine = SearchEngine::new(SearchOptions::default());
        let doc = engine.encrypt_text(&ctx, "bench", &text, &mut |_| {}).unwrap();

        group.bench_with_input(
            BenchmarkId::new("single_token", format!("{}_batches", batches)),
            &batches,
            |b, _| {
                b.iter(|| engine.search(&ctx, &doc, "word42", None, &mut |_| {}).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("encrypt_text", format!("{}_batches", batches)),
            &batches,
            |b, _| {
                b.iter(|| engine.encrypt_text(&ctx, "bench", &text, &mut |_| {}).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, search_benchmark);
criterion_main!(benches);
