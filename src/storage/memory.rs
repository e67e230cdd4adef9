//! In-memory storage implementation for tests and ephemeral collections.

use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::{Result, SagittaError};
use crate::storage::Storage;

/// Storage keeping all files in memory.
///
/// Writes are trivially atomic: the blob is swapped in under a write lock.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<AHashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(SagittaError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.check_closed()?;

        self.files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SagittaError::not_found(format!("file not found: {name}")))
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.check_closed()?;

        self.files.write().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        self.files.write().remove(name);
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        !self.closed.load(Ordering::Acquire) && self.files.read().contains_key(name)
    }

    fn list(&self) -> Result<Vec<String>> {
        self.check_closed()?;

        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
