use std::fs;

use tempfile::TempDir;

use sagitta::collection::{CollectionConfig, Selector};
use sagitta::document::DocumentPayload;
use sagitta::error::{Result, SagittaError};
use sagitta::manager::CollectionManager;
use sagitta::snapshot::SNAPSHOT_FILE;
use sagitta::vector::DistanceMetric;

#[test]
fn get_or_create_returns_the_same_instance_while_open() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    let first = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    first.add(vec![payload("a", vec![1.0, 0.0])])?;

    let second = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    assert_eq!(second.count(), 1);
    assert_eq!(manager.open_collections(), vec!["notes".to_string()]);
    Ok(())
}

#[test]
fn collections_reload_from_disk_across_managers() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let manager = CollectionManager::new(dir.path())?;
        let collection = manager.get_or_create(CollectionConfig::new("notes"), None)?;
        collection.add(vec![payload("a", vec![1.0, 0.0])])?;
        manager.close_all()?;
    }

    let manager = CollectionManager::new(dir.path())?;
    assert!(manager.open_collections().is_empty());

    let collection = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    assert_eq!(collection.count(), 1);
    assert_eq!(collection.get(&Selector::ids(["a"]))?.len(), 1);
    Ok(())
}

#[test]
fn metric_conflict_with_an_open_collection_is_invalid() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    manager.get_or_create(CollectionConfig::new("notes"), None)?;
    let result = manager.get_or_create(
        CollectionConfig::new("notes").with_metric(DistanceMetric::Euclidean),
        None,
    );
    assert!(matches!(result, Err(SagittaError::InvalidArgument(_))));
    Ok(())
}

#[test]
fn drop_collection_removes_durable_state() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    let collection = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    collection.add(vec![payload("a", vec![1.0, 0.0])])?;

    manager.drop_collection("notes")?;
    assert!(manager.open_collections().is_empty());
    assert!(!dir.path().join("notes").exists());

    // Recreating starts from scratch.
    let recreated = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    assert_eq!(recreated.count(), 0);
    Ok(())
}

#[test]
fn drop_unknown_collection_is_not_found() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    assert!(matches!(
        manager.drop_collection("ghost"),
        Err(SagittaError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn open_requires_an_existing_collection() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    assert!(matches!(
        manager.open("ghost", None),
        Err(SagittaError::NotFound(_))
    ));

    manager.get_or_create(
        CollectionConfig::new("notes").with_metric(DistanceMetric::Euclidean),
        None,
    )?;
    manager.close_all()?;

    // open() picks up the persisted metric without being told.
    let reopened = manager.open("notes", None)?;
    assert_eq!(reopened.metric(), DistanceMetric::Euclidean);
    Ok(())
}

#[test]
fn close_all_closes_collections_but_keeps_the_registry_usable() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    let collection = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    collection.add(vec![payload("a", vec![1.0, 0.0])])?;
    manager.close_all()?;

    assert!(collection.is_closed());
    assert!(matches!(
        collection.add(vec![payload("b", vec![0.0, 1.0])]),
        Err(SagittaError::Closed)
    ));

    // The registry can re-open the collection afterwards.
    let reopened = manager.get_or_create(CollectionConfig::new("notes"), None)?;
    assert_eq!(reopened.count(), 1);
    Ok(())
}

#[test]
fn one_corrupt_collection_does_not_poison_the_manager() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let manager = CollectionManager::new(dir.path())?;
        let good = manager.get_or_create(CollectionConfig::new("good"), None)?;
        good.add(vec![payload("a", vec![1.0, 0.0])])?;
        let bad = manager.get_or_create(CollectionConfig::new("bad"), None)?;
        bad.add(vec![payload("b", vec![0.0, 1.0])])?;
        manager.close_all()?;
    }

    // Corrupt one snapshot on disk.
    let bad_snapshot = dir.path().join("bad").join(SNAPSHOT_FILE);
    let mut bytes = fs::read(&bad_snapshot)?;
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    fs::write(&bad_snapshot, &bytes)?;

    let manager = CollectionManager::new(dir.path())?;
    assert!(matches!(
        manager.open("bad", None),
        Err(SagittaError::CorruptSnapshot(_))
    ));

    // The healthy collection still opens and serves.
    let good = manager.open("good", None)?;
    assert_eq!(good.count(), 1);
    Ok(())
}

#[test]
fn invalid_collection_names_are_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let manager = CollectionManager::new(dir.path())?;

    for name in ["", "../escape", "a/b", ".hidden"] {
        assert!(matches!(
            manager.get_or_create(CollectionConfig::new(name), None),
            Err(SagittaError::InvalidArgument(_))
        ));
    }
    Ok(())
}

fn payload(id: &str, vector: Vec<f64>) -> DocumentPayload {
    DocumentPayload::text(format!("text for {id}"))
        .with_id(id)
        .with_vector(vector)
}
