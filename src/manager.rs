//! Process-wide registry of open collections.
//!
//! A [`CollectionManager`] is an explicitly constructed, explicitly owned
//! instance — not a singleton — so one process can hold several isolated
//! registries (useful for tests). Each collection gets its own directory
//! under the manager's root and its own [`FileStorage`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use log::info;
use parking_lot::Mutex;

use crate::collection::{Collection, CollectionConfig};
use crate::embedding::Embedder;
use crate::error::{Result, SagittaError};
use crate::storage::FileStorage;

/// Registry of open collections keyed by name.
#[derive(Debug)]
pub struct CollectionManager {
    root: PathBuf,
    collections: Mutex<AHashMap<String, Arc<Collection>>>,
}

impl CollectionManager {
    /// Create a manager rooted at the given directory, creating it if
    /// needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                SagittaError::storage(format!(
                    "failed to create manager root {}: {e}",
                    root.display()
                ))
            })?;
        }

        Ok(Self {
            root,
            collections: Mutex::new(AHashMap::new()),
        })
    }

    /// The directory collections are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the open collection with this name, loading or creating it if
    /// necessary.
    ///
    /// An already-open collection is returned as-is after checking that the
    /// requested metric matches. Otherwise the persisted snapshot is loaded
    /// when one exists, and an empty collection is created when it does not.
    pub fn get_or_create(
        &self,
        config: CollectionConfig,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Arc<Collection>> {
        validate_name(&config.name)?;

        let mut collections = self.collections.lock();
        if let Some(existing) = collections.get(&config.name) {
            if existing.metric() != config.metric {
                return Err(SagittaError::invalid_argument(format!(
                    "collection '{}' is open with metric {}, requested {}",
                    config.name,
                    existing.metric().name(),
                    config.metric.name()
                )));
            }
            return Ok(existing.clone());
        }

        let storage = Arc::new(FileStorage::new(self.collection_dir(&config.name))?);
        let name = config.name.clone();
        let collection = Arc::new(Collection::open_or_create(config, storage, embedder)?);
        collections.insert(name.clone(), collection.clone());

        info!("collection '{name}' is open ({} documents)", collection.count());
        Ok(collection)
    }

    /// Return an existing collection, opening its persisted snapshot with
    /// whatever metric it records.
    ///
    /// Fails with [`SagittaError::NotFound`] when the name is neither open
    /// nor present on disk.
    pub fn open(
        &self,
        name: &str,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Arc<Collection>> {
        validate_name(name)?;

        let mut collections = self.collections.lock();
        if let Some(existing) = collections.get(name) {
            return Ok(existing.clone());
        }

        let directory = self.collection_dir(name);
        if !directory.exists() {
            return Err(SagittaError::not_found(format!("collection: {name}")));
        }

        let storage = Arc::new(FileStorage::new(directory)?);
        let collection = Arc::new(Collection::open_persisted(name, storage, embedder)?);
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }

    /// Names of the collections currently open in this manager.
    pub fn open_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of every collection under the manager's root, open or not.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| SagittaError::storage(e.to_string()))? {
            let entry = entry.map_err(|e| SagittaError::storage(e.to_string()))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Close a collection and delete its persisted snapshot.
    ///
    /// Fails with [`SagittaError::NotFound`] when the name is neither open
    /// nor present on disk.
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let existing = self.collections.lock().remove(name);
        let directory = self.collection_dir(name);

        if existing.is_none() && !directory.exists() {
            return Err(SagittaError::not_found(format!("collection: {name}")));
        }

        if let Some(collection) = existing {
            collection.close()?;
        }
        if directory.exists() {
            fs::remove_dir_all(&directory).map_err(|e| {
                SagittaError::storage(format!("failed to delete collection '{name}': {e}"))
            })?;
        }

        info!("dropped collection '{name}'");
        Ok(())
    }

    /// Close every open collection. The registry stays usable; collections
    /// can be re-opened afterwards.
    pub fn close_all(&self) -> Result<()> {
        let drained: Vec<(String, Arc<Collection>)> =
            self.collections.lock().drain().collect();

        let mut first_error = None;
        for (_, collection) in drained {
            if let Err(e) = collection.close() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn collection_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Validate a collection name for use as a directory component.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SagittaError::invalid_argument(
            "collection name must not be empty",
        ));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid || name.starts_with('.') {
        return Err(SagittaError::invalid_argument(format!(
            "collection name '{name}' contains unsupported characters"
        )));
    }
    Ok(())
}
