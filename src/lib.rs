//! # Sagitta
//!
//! An embedded vector store for Rust: durable named collections of
//! documents, metadata, and fixed-dimension `f64` embeddings with exact
//! nearest-neighbor search.
//!
//! ## Features
//!
//! - Pure Rust implementation, no external database
//! - Exact similarity search under cosine, euclidean, and dot-product metrics
//! - Metadata filtering with equality, range, and membership operators
//! - Maximal-marginal-relevance re-ranking for result diversity
//! - Write-through persistence with atomic, checksummed snapshots
//! - Deterministic result ordering (insertion-order tie-breaking)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use sagitta::collection::{Collection, CollectionConfig};
//! use sagitta::document::DocumentPayload;
//! use sagitta::query::SearchRequest;
//! use sagitta::storage::MemoryStorage;
//!
//! # fn main() -> sagitta::error::Result<()> {
//! let collection = Collection::create(
//!     CollectionConfig::new("notes"),
//!     Arc::new(MemoryStorage::new()),
//!     None,
//! )?;
//!
//! collection.add(vec![
//!     DocumentPayload::text("north").with_id("a").with_vector(vec![1.0, 0.0]),
//!     DocumentPayload::text("east").with_id("b").with_vector(vec![0.0, 1.0]),
//! ])?;
//!
//! let results = collection.query(&SearchRequest::new(vec![1.0, 0.0], 1))?;
//! assert_eq!(results.hits[0].document.id, "a");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod collection;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod index;
pub mod manager;
pub mod query;
pub mod snapshot;
pub mod storage;
pub mod vector;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
