//! Similarity-search execution.
//!
//! The engine runs the search pipeline over a collection's in-memory state:
//! resolve the candidate set from the metadata filter, rank candidates via
//! the embedding index, truncate, apply the score threshold, and optionally
//! re-rank for diversity. Queries are read-only; the caller holds the
//! collection's read lock for the duration.

use ahash::{AHashMap, AHashSet};

use crate::collection::StoredDocument;
use crate::error::{Result, SagittaError};
use crate::index::VectorIndex;
use crate::query::mmr::{self, MmrCandidate};
use crate::query::{SearchHit, SearchMode, SearchRequest, SearchResults};
use crate::vector::{DistanceMetric, vector};

/// Execute a search request against a collection's state.
pub(crate) fn execute(
    request: &SearchRequest,
    metric: DistanceMetric,
    dimension: Option<usize>,
    documents: &AHashMap<String, StoredDocument>,
    index: &dyn VectorIndex,
) -> Result<SearchResults> {
    if request.k == 0 {
        return Err(SagittaError::invalid_argument("k must be positive"));
    }
    if let SearchMode::Mmr(options) = &request.mode {
        if !(0.0..=1.0).contains(&options.lambda) {
            return Err(SagittaError::invalid_argument(format!(
                "lambda must be in [0, 1], got {}",
                options.lambda
            )));
        }
        if options.fetch_k < request.k {
            return Err(SagittaError::invalid_argument(format!(
                "fetch_k ({}) must be at least k ({})",
                options.fetch_k, request.k
            )));
        }
    }

    vector::ensure_valid(&request.vector, metric)?;
    if let Some(dimension) = dimension {
        vector::ensure_dimension(dimension, request.vector.len())?;
    }

    // Candidate resolution: every document, or the subset whose metadata
    // satisfies the filter. A filter that matches nothing short-circuits.
    let candidates: Option<AHashSet<String>> = match &request.filter {
        Some(filter) if !filter.is_empty() => {
            let matching: AHashSet<String> = documents
                .iter()
                .filter(|(_, stored)| filter.matches(&stored.document.metadata))
                .map(|(id, _)| id.clone())
                .collect();
            if matching.is_empty() {
                return Ok(SearchResults::default());
            }
            Some(matching)
        }
        _ => None,
    };

    let pool_size = match &request.mode {
        SearchMode::Similarity => request.k,
        SearchMode::Mmr(options) => options.fetch_k,
    };

    let mut ranked = index.rank(&request.vector, candidates.as_ref())?;
    ranked.truncate(pool_size);

    if let Some(threshold) = request.score_threshold {
        ranked.retain(|entry| entry.distance <= threshold);
    }

    let hits = match &request.mode {
        SearchMode::Similarity => ranked
            .into_iter()
            .map(|entry| hit_for(documents, &entry.id, entry.distance))
            .collect::<Result<Vec<_>>>()?,
        SearchMode::Mmr(options) => {
            let pool = ranked
                .into_iter()
                .map(|entry| {
                    let stored = lookup(documents, &entry.id)?;
                    Ok(MmrCandidate {
                        id: entry.id,
                        seq: entry.seq,
                        distance: entry.distance,
                        vector: stored.document.vector.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            mmr::rerank(metric, pool, request.k, options.lambda)?
                .into_iter()
                .map(|candidate| hit_for(documents, &candidate.id, candidate.distance))
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(SearchResults { hits })
}

fn lookup<'a>(
    documents: &'a AHashMap<String, StoredDocument>,
    id: &str,
) -> Result<&'a StoredDocument> {
    documents.get(id).ok_or_else(|| {
        // The index diverged from the documents map; this is an internal
        // invariant violation, not a caller error.
        SagittaError::storage(format!("index entry {id} has no stored document"))
    })
}

fn hit_for(
    documents: &AHashMap<String, StoredDocument>,
    id: &str,
    distance: f64,
) -> Result<SearchHit> {
    let stored = lookup(documents, id)?;
    Ok(SearchHit {
        document: stored.document.clone(),
        distance,
    })
}
