use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use sagitta::collection::{Collection, CollectionConfig, Selector};
use sagitta::document::DocumentPayload;
use sagitta::error::{Result, SagittaError};
use sagitta::query::SearchRequest;
use sagitta::snapshot::SNAPSHOT_FILE;
use sagitta::storage::{FileStorage, Storage};
use sagitta::vector::DistanceMetric;

#[test]
fn flush_then_load_yields_an_identical_collection() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.add(vec![
        payload("a", vec![1.0, 0.0]).with_metadata("source", "tweet"),
        payload("b", vec![0.0, 1.0]).with_metadata("rank", 3i64),
        payload("c", vec![1.0, 1.0]),
    ])?;
    let before = original.get(&Selector::default())?;
    original.close()?;

    let reloaded = open_collection(dir.path(), DistanceMetric::Cosine)?;
    assert_eq!(reloaded.count(), 3);
    assert_eq!(reloaded.dimension(), Some(2));
    assert_eq!(reloaded.metric(), DistanceMetric::Cosine);

    let after = reloaded.get(&Selector::default())?;
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn insertion_order_tie_breaking_survives_reload() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.add(vec![
        payload("a", vec![1.0, 0.0]),
        payload("b", vec![0.0, 1.0]),
    ])?;
    original.close()?;

    let reloaded = open_collection(dir.path(), DistanceMetric::Cosine)?;
    let results = reloaded.query(&SearchRequest::new(vec![1.0, 1.0], 2))?;
    let ids: Vec<&str> = results.hits.iter().map(|h| h.document.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    Ok(())
}

#[test]
fn mutations_write_through_without_an_explicit_flush() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Euclidean)?;
    original.add(vec![payload("a", vec![1.0, 0.0])])?;
    original.delete(&Selector::ids(["a"]))?;
    original.add(vec![payload("b", vec![2.0, 2.0])])?;
    // No flush, no close: the write-through snapshot must already be current.

    let reloaded = open_collection(dir.path(), DistanceMetric::Euclidean)?;
    let documents = reloaded.get(&Selector::default())?;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "b");
    Ok(())
}

#[test]
fn opening_without_a_snapshot_is_not_found() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()).unwrap());

    let result = Collection::open(
        CollectionConfig::new("missing"),
        storage,
        None,
    );
    assert!(matches!(result, Err(SagittaError::NotFound(_))));
}

#[test]
fn corrupted_snapshot_fails_to_load() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.add(vec![payload("a", vec![1.0, 0.0])])?;
    original.close()?;

    // Flip a byte in the middle of the snapshot.
    let path = dir.path().join(SNAPSHOT_FILE);
    let mut bytes = fs::read(&path)?;
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    fs::write(&path, &bytes)?;

    let result = open_collection(dir.path(), DistanceMetric::Cosine);
    assert!(matches!(result, Err(SagittaError::CorruptSnapshot(_))));
    Ok(())
}

#[test]
fn future_format_version_is_rejected_as_unsupported() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.add(vec![payload("a", vec![1.0, 0.0])])?;
    original.close()?;

    let path = dir.path().join(SNAPSHOT_FILE);
    let mut bytes = fs::read(&path)?;
    bytes[4..8].copy_from_slice(&42u32.to_le_bytes());
    fs::write(&path, &bytes)?;

    let result = open_collection(dir.path(), DistanceMetric::Cosine);
    assert!(matches!(result, Err(SagittaError::UnsupportedVersion(42))));
    Ok(())
}

#[test]
fn metric_conflict_on_open_is_invalid() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.close()?;

    let storage = Arc::new(FileStorage::new(dir.path())?);
    let result = Collection::open(
        CollectionConfig::new("durable").with_metric(DistanceMetric::DotProduct),
        storage,
        None,
    );
    assert!(matches!(result, Err(SagittaError::InvalidArgument(_))));
    Ok(())
}

#[test]
fn open_persisted_uses_the_snapshot_metric() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::DotProduct)?;
    original.add(vec![payload("a", vec![1.0, 2.0])])?;
    original.close()?;

    let storage = Arc::new(FileStorage::new(dir.path())?);
    let reloaded = Collection::open_persisted("durable", storage, None)?;
    assert_eq!(reloaded.metric(), DistanceMetric::DotProduct);
    assert_eq!(reloaded.count(), 1);
    Ok(())
}

#[test]
fn repeated_flushes_leave_a_single_snapshot_file() -> Result<()> {
    let dir = TempDir::new()?;

    let collection = open_collection(dir.path(), DistanceMetric::Cosine)?;
    for i in 0..10 {
        collection.add(vec![payload(&format!("doc-{i}"), vec![i as f64 + 1.0, 1.0])])?;
    }

    let storage = FileStorage::new(dir.path())?;
    assert_eq!(storage.list()?, vec![SNAPSHOT_FILE.to_string()]);
    Ok(())
}

#[test]
fn dimension_hint_conflict_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;

    let original = open_collection(dir.path(), DistanceMetric::Cosine)?;
    original.add(vec![payload("a", vec![1.0, 0.0])])?;
    original.close()?;

    let storage = Arc::new(FileStorage::new(dir.path())?);
    let result = Collection::open(
        CollectionConfig::new("durable")
            .with_metric(DistanceMetric::Cosine)
            .with_dimension_hint(5),
        storage,
        None,
    );
    assert!(matches!(result, Err(SagittaError::InvalidArgument(_))));
    Ok(())
}

fn open_collection(path: &std::path::Path, metric: DistanceMetric) -> Result<Collection> {
    let storage = Arc::new(FileStorage::new(path)?);
    Collection::open_or_create(
        CollectionConfig::new("durable").with_metric(metric),
        storage,
        None,
    )
}

fn payload(id: &str, vector: Vec<f64>) -> DocumentPayload {
    DocumentPayload::text(format!("text for {id}"))
        .with_id(id)
        .with_vector(vector)
}
