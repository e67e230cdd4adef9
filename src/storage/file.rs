//! File-based storage implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, SagittaError};
use crate::storage::Storage;

/// Suffix for in-flight atomic writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Storage backed by a directory on the local filesystem.
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    closed: AtomicBool,
}

impl FileStorage {
    /// Create a file storage rooted at the given directory, creating it if
    /// needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                SagittaError::storage(format!(
                    "failed to create directory {}: {e}",
                    directory.display()
                ))
            })?;
        }
        if !directory.is_dir() {
            return Err(SagittaError::storage(format!(
                "path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage {
            directory,
            closed: AtomicBool::new(false),
        })
    }

    /// The directory this storage is rooted at.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(SagittaError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.check_closed()?;

        fs::read(self.file_path(name)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SagittaError::not_found(format!("file not found: {name}"))
            } else {
                SagittaError::storage(e.to_string())
            }
        })
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.check_closed()?;

        let final_path = self.file_path(name);
        let temp_path = self.file_path(&format!("{name}{TEMP_SUFFIX}"));

        let mut file = fs::File::create(&temp_path)
            .map_err(|e| SagittaError::storage(format!("failed to create temp file: {e}")))?;
        file.write_all(bytes)
            .map_err(|e| SagittaError::storage(format!("failed to write temp file: {e}")))?;
        file.sync_all()
            .map_err(|e| SagittaError::storage(format!("failed to sync temp file: {e}")))?;
        drop(file);

        fs::rename(&temp_path, &final_path).map_err(|e| {
            // Leave no half-written temp file behind.
            let _ = fs::remove_file(&temp_path);
            SagittaError::storage(format!("failed to replace {name}: {e}"))
        })
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        let path = self.file_path(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| SagittaError::storage(format!("failed to delete {name}: {e}")))?;
        }
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        !self.closed.load(Ordering::Acquire) && self.file_path(name).exists()
    }

    fn list(&self) -> Result<Vec<String>> {
        self.check_closed()?;

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)
            .map_err(|e| SagittaError::storage(e.to_string()))?
        {
            let entry = entry.map_err(|e| SagittaError::storage(e.to_string()))?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    if !name.ends_with(TEMP_SUFFIX) {
                        files.push(name.to_string());
                    }
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.write_atomic("data.bin", b"hello").unwrap();
        assert_eq!(storage.read("data.bin").unwrap(), b"hello");
        assert!(storage.exists("data.bin"));
    }

    #[test]
    fn test_atomic_replace_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.write_atomic("data.bin", b"v1").unwrap();
        storage.write_atomic("data.bin", b"v2").unwrap();

        assert_eq!(storage.read("data.bin").unwrap(), b"v2");
        assert_eq!(storage.list().unwrap(), vec!["data.bin".to_string()]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(matches!(
            storage.read("missing.bin"),
            Err(SagittaError::NotFound(_))
        ));
        // Idempotent delete.
        assert!(storage.delete("missing.bin").is_ok());
    }

    #[test]
    fn test_closed_storage_rejects_operations() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.close().unwrap();

        assert!(matches!(
            storage.read("data.bin"),
            Err(SagittaError::Closed)
        ));
        assert!(matches!(
            storage.write_atomic("data.bin", b"x"),
            Err(SagittaError::Closed)
        ));
        assert!(!storage.exists("data.bin"));
    }
}
