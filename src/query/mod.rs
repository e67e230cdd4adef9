//! Query types and the search pipeline.
//!
//! # Module Structure
//!
//! - `engine`: similarity-search execution against a collection's state
//! - `mmr`: maximal-marginal-relevance re-ranking

pub mod engine;
pub mod mmr;

use serde::Serialize;

use crate::document::Document;
use crate::filter::Filter;

/// How search results are selected from the ranked candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    /// Plain similarity ranking: the k nearest candidates.
    Similarity,
    /// Maximal marginal relevance: trade query relevance against diversity
    /// among the selected results.
    Mmr(MmrOptions),
}

/// Parameters for MMR re-ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct MmrOptions {
    /// Relevance/diversity trade-off in `[0, 1]`. `1.0` is pure relevance.
    pub lambda: f64,
    /// Size of the candidate pool the re-ranker may select from. Must be at
    /// least `k`. The re-ranker never looks outside this pool.
    pub fetch_k: usize,
}

impl Default for MmrOptions {
    fn default() -> Self {
        Self {
            lambda: 0.5,
            fetch_k: 20,
        }
    }
}

/// A similarity-search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// The query vector.
    pub vector: Vec<f64>,
    /// Maximum number of results.
    pub k: usize,
    /// Optional metadata filter restricting the candidate set.
    pub filter: Option<Filter>,
    /// Optional cutoff: hits whose distance exceeds this are dropped.
    pub score_threshold: Option<f64>,
    /// Result selection mode.
    pub mode: SearchMode,
}

impl SearchRequest {
    /// Creates a plain similarity request.
    pub fn new(vector: Vec<f64>, k: usize) -> Self {
        Self {
            vector,
            k,
            filter: None,
            score_threshold: None,
            mode: SearchMode::Similarity,
        }
    }

    /// Restricts candidates to documents matching the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Drops hits whose distance exceeds the threshold.
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Switches to MMR re-ranking.
    pub fn with_mmr(mut self, lambda: f64, fetch_k: usize) -> Self {
        self.mode = SearchMode::Mmr(MmrOptions { lambda, fetch_k });
        self
    }
}

/// A single search hit: the document and its distance from the query.
///
/// Smaller distance means more similar, for every metric.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matched document.
    pub document: Document,
    /// Distance from the query vector under the collection's metric.
    pub distance: f64,
}

/// Ordered search results, most similar first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// The hits, ordered by non-decreasing distance (similarity mode) or MMR
    /// selection order.
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no hits matched.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
