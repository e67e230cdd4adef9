//! Embedding index: id → vector lookup structures for similarity ranking.
//!
//! The index is a derived structure over a collection's documents and is kept
//! in lockstep with every mutation. [`FlatIndex`] is the exact linear-scan
//! implementation; the [`VectorIndex`] trait is the seam an approximate
//! structure would implement.

pub mod flat;

use ahash::AHashSet;

use crate::error::Result;

pub use self::flat::FlatIndex;

/// A ranked index entry produced by [`VectorIndex::rank`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// Document id.
    pub id: String,
    /// Insertion sequence, used as the stable tie-break.
    pub seq: u64,
    /// Distance from the query vector (smaller is more similar).
    pub distance: f64,
}

/// Trait for embedding index implementations.
///
/// Implementations must keep per-mutation maintenance bounded: inserting or
/// removing a single document must not trigger a full rebuild.
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    /// Insert a vector for a new document, or replace the vector of an
    /// existing one. The sequence number is preserved by the caller across
    /// replacements so tie-breaking stays stable under update.
    fn upsert(&mut self, id: &str, seq: u64, vector: Vec<f64>);

    /// Remove a document's vector. Returns `false` when the id is unknown.
    fn remove(&mut self, id: &str) -> bool;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rank indexed vectors by distance to the query, most similar first.
    ///
    /// When `candidates` is given, only those ids participate. Ordering is
    /// total: distance ascending, then insertion sequence ascending, so equal
    /// distances resolve deterministically.
    fn rank(&self, query: &[f64], candidates: Option<&AHashSet<String>>) -> Result<Vec<Ranked>>;
}
