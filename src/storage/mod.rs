//! Storage abstraction for persisted collection state.
//!
//! The persistence layer reads and writes whole snapshot blobs, so the
//! [`Storage`] trait deals in complete named files rather than streaming
//! handles. Two backends ship: [`FileStorage`](file::FileStorage) for durable
//! on-disk collections and [`MemoryStorage`](memory::MemoryStorage) for
//! tests.

pub mod file;
pub mod memory;

use crate::error::Result;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;

/// A backend that stores named binary blobs.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Read a file's full contents.
    ///
    /// Fails with [`crate::error::SagittaError::NotFound`] when the file does
    /// not exist.
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace a file's contents atomically.
    ///
    /// The bytes are written to a temporary location and moved into place in
    /// one step, so a crash mid-write leaves either the old or the new file,
    /// never a partial one.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Delete a file. Deleting a missing file is a no-op.
    fn delete(&self, name: &str) -> Result<()>;

    /// Check whether a file exists.
    fn exists(&self, name: &str) -> bool;

    /// List all stored file names.
    fn list(&self) -> Result<Vec<String>>;

    /// Close the storage and release resources. Subsequent operations fail.
    fn close(&self) -> Result<()>;
}
