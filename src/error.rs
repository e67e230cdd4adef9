//! Error types for the Sagitta library.
//!
//! All fallible operations in Sagitta return [`Result`], whose error type is
//! the [`SagittaError`] enum defined here. Validation errors are raised before
//! any state is mutated, so a failed call never leaves a collection partially
//! updated.
//!
//! # Examples
//!
//! ```
//! use sagitta::error::{Result, SagittaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SagittaError::invalid_argument("k must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Sagitta operations.
#[derive(Error, Debug)]
pub enum SagittaError {
    /// A vector's length differs from the collection's fixed dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension fixed for the collection.
        expected: usize,
        /// The offending vector's length.
        actual: usize,
    },

    /// A document id is already present in the collection.
    #[error("duplicate document id: {0}")]
    DuplicateId(String),

    /// A named entity (document, collection, snapshot) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A metadata filter uses an operator the engine does not support.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// A persisted snapshot failed checksum or format validation.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A persisted snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// The collection has been closed; no further operations are allowed.
    #[error("collection is closed")]
    Closed,

    /// A zero-norm vector was supplied under the cosine metric.
    #[error("zero vector: cosine distance is undefined for zero-norm vectors")]
    ZeroVector,

    /// Storage-related errors.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error (snapshot records, metadata encoding).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O errors (file operations etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error from embedder or other boundary code.
    #[error("error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`SagittaError`].
pub type Result<T> = std::result::Result<T, SagittaError>;

impl SagittaError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidArgument(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        SagittaError::NotFound(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SagittaError::Storage(msg.into())
    }

    /// Create a new corrupt snapshot error.
    pub fn corrupt_snapshot<S: Into<String>>(msg: S) -> Self {
        SagittaError::CorruptSnapshot(msg.into())
    }

    /// Create a new unsupported filter error.
    pub fn unsupported_filter<S: Into<String>>(msg: S) -> Self {
        SagittaError::UnsupportedFilter(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SagittaError::Serialization(msg.into())
    }
}
