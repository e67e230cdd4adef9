//! Embedder backed by a fixed lookup table.
//!
//! [`PrecomputedEmbedder`] resolves texts against a table of pre-computed
//! vectors instead of running a model. Use it when vectors are computed
//! externally before indexing, or in tests that need deterministic
//! embeddings without model weights.

use ahash::AHashMap;

use crate::embedding::Embedder;
use crate::error::{Result, SagittaError};

/// An embedder that resolves texts from a pre-computed table.
///
/// Texts without a table entry fail with
/// [`SagittaError::NotFound`] rather than producing a fallback vector, since
/// a silent fallback would break reproducibility.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedder {
    dimension: usize,
    table: AHashMap<String, Vec<f64>>,
}

impl PrecomputedEmbedder {
    /// Creates an empty embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: AHashMap::new(),
        }
    }

    /// Registers the embedding for a text.
    ///
    /// Panics in debug builds if the vector's length differs from the
    /// embedder's dimension; release builds surface the mismatch at embed
    /// time through collection validation.
    pub fn insert(&mut self, text: impl Into<String>, vector: Vec<f64>) {
        debug_assert_eq!(vector.len(), self.dimension);
        self.table.insert(text.into(), vector);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f64>) -> Self {
        self.insert(text, vector);
        self
    }
}

impl Embedder for PrecomputedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| SagittaError::not_found(format!("no precomputed embedding for text: {text:?}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
