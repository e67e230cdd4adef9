//! Maximal marginal relevance re-ranking.
//!
//! MMR iteratively selects the candidate maximizing
//! `lambda * sim(query, doc) - (1 - lambda) * max_sim(doc, selected)`,
//! trading relevance against redundancy among the already-selected results.
//! It is a pure post-process over the top-`fetch_k` ranked pool; it never
//! reaches outside that pool.

use crate::error::Result;
use crate::vector::DistanceMetric;

/// A pooled candidate entering MMR selection.
#[derive(Debug, Clone)]
pub(crate) struct MmrCandidate {
    /// Document id.
    pub(crate) id: String,
    /// Insertion sequence, the stable tie-break.
    pub(crate) seq: u64,
    /// Distance from the query vector.
    pub(crate) distance: f64,
    /// The candidate's vector, for pairwise similarity.
    pub(crate) vector: Vec<f64>,
}

/// Select up to `k` candidates by maximal marginal relevance.
///
/// Ties on the marginal score resolve to the earlier-inserted candidate so
/// repeated queries stay deterministic.
pub(crate) fn rerank(
    metric: DistanceMetric,
    mut pool: Vec<MmrCandidate>,
    k: usize,
    lambda: f64,
) -> Result<Vec<MmrCandidate>> {
    let mut selected: Vec<MmrCandidate> = Vec::with_capacity(k.min(pool.len()));

    while selected.len() < k && !pool.is_empty() {
        let mut best: Option<(usize, f64, u64)> = None;

        for (position, candidate) in pool.iter().enumerate() {
            let relevance = metric.similarity_from_distance(candidate.distance);

            let mut redundancy = f64::NEG_INFINITY;
            for chosen in &selected {
                let sim = metric.similarity(&candidate.vector, &chosen.vector)?;
                redundancy = redundancy.max(sim);
            }
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };

            let score = lambda * relevance - (1.0 - lambda) * redundancy;

            let better = match best {
                None => true,
                Some((_, best_score, best_seq)) => {
                    score > best_score || (score == best_score && candidate.seq < best_seq)
                }
            };
            if better {
                best = Some((position, score, candidate.seq));
            }
        }

        let Some((position, _, _)) = best else {
            break;
        };
        selected.push(pool.swap_remove(position));
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, seq: u64, vector: Vec<f64>, query: &[f64]) -> MmrCandidate {
        let distance = DistanceMetric::Cosine.distance(query, &vector).unwrap();
        MmrCandidate {
            id: id.to_string(),
            seq,
            distance,
            vector,
        }
    }

    #[test]
    fn test_pure_relevance_matches_distance_order() {
        let query = [1.0, 0.0];
        let pool = vec![
            candidate("far", 0, vec![0.0, 1.0], &query),
            candidate("near", 1, vec![1.0, 0.1], &query),
        ];

        let selected = rerank(DistanceMetric::Cosine, pool, 2, 1.0).unwrap();
        assert_eq!(selected[0].id, "near");
        assert_eq!(selected[1].id, "far");
    }

    #[test]
    fn test_diversity_pushes_away_near_duplicates() {
        let query = [1.0, 0.0];
        // Two near-duplicates close to the query plus one distinct candidate.
        let pool = vec![
            candidate("dup1", 0, vec![1.0, 0.01], &query),
            candidate("dup2", 1, vec![1.0, 0.02], &query),
            candidate("other", 2, vec![0.5, 0.5], &query),
        ];

        let selected = rerank(DistanceMetric::Cosine, pool, 2, 0.3).unwrap();
        assert_eq!(selected[0].id, "dup1");
        // With diversity weighted heavily the second pick skips the duplicate.
        assert_eq!(selected[1].id, "other");
    }

    #[test]
    fn test_ties_resolve_by_insertion_order() {
        let query = [1.0, 1.0];
        let pool = vec![
            candidate("b", 5, vec![0.0, 1.0], &query),
            candidate("a", 2, vec![1.0, 0.0], &query),
        ];

        let selected = rerank(DistanceMetric::Cosine, pool, 1, 1.0).unwrap();
        assert_eq!(selected[0].id, "a");
    }

    #[test]
    fn test_pool_smaller_than_k() {
        let query = [1.0, 0.0];
        let pool = vec![candidate("only", 0, vec![1.0, 0.0], &query)];

        let selected = rerank(DistanceMetric::Cosine, pool, 5, 0.5).unwrap();
        assert_eq!(selected.len(), 1);
    }
}
