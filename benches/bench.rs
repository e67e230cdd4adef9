use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sagitta::collection::{Collection, CollectionConfig};
use sagitta::document::DocumentPayload;
use sagitta::query::SearchRequest;
use sagitta::storage::MemoryStorage;
use sagitta::vector::DistanceMetric;

const DIMENSION: usize = 128;

fn build_collection(documents: usize) -> Collection {
    let mut rng = StdRng::seed_from_u64(42);
    let collection = Collection::create(
        CollectionConfig::new("bench").with_metric(DistanceMetric::Cosine),
        Arc::new(MemoryStorage::new()),
        None,
    )
    .unwrap();

    let payloads: Vec<DocumentPayload> = (0..documents)
        .map(|i| {
            let vector: Vec<f64> = (0..DIMENSION).map(|_| rng.random::<f64>() - 0.5).collect();
            DocumentPayload::text(format!("document {i}"))
                .with_id(format!("doc-{i}"))
                .with_vector(vector)
        })
        .collect();
    collection.add(payloads).unwrap();
    collection
}

fn query_vector() -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..DIMENSION).map(|_| rng.random::<f64>() - 0.5).collect()
}

fn bench_flat_search(c: &mut Criterion) {
    for &size in &[1_000usize, 10_000] {
        let collection = build_collection(size);
        let query = query_vector();

        c.bench_function(&format!("flat_search_{size}_k10"), |b| {
            b.iter(|| {
                collection
                    .query(&SearchRequest::new(query.clone(), 10))
                    .unwrap()
            })
        });
    }
}

fn bench_mmr_search(c: &mut Criterion) {
    let collection = build_collection(1_000);
    let query = query_vector();

    c.bench_function("mmr_search_1000_k10_fetch50", |b| {
        b.iter(|| {
            collection
                .query(&SearchRequest::new(query.clone(), 10).with_mmr(0.5, 50))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_flat_search, bench_mmr_search);
criterion_main!(benches);
