//! Distance metrics for vector similarity calculation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagittaError};

/// Number of candidates below which batch scans stay sequential.
///
/// Small collections are scanned on the calling thread so results stay
/// allocation-free and deterministic in tests.
const PARALLEL_SCAN_THRESHOLD: usize = 256;

/// Distance metrics for vector similarity calculation.
///
/// Every metric is expressed as a distance where smaller means more similar,
/// so ranking is uniform across metrics: cosine similarity is converted via
/// `1 - similarity`, and dot product is negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine distance (`1 - cosine similarity`).
    #[default]
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Negated dot product (higher dot product = closer).
    DotProduct,
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    ///
    /// Fails with [`SagittaError::DimensionMismatch`] when the lengths differ
    /// and with [`SagittaError::ZeroVector`] for zero-norm vectors under the
    /// cosine metric.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(SagittaError::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        let result = match self {
            DistanceMetric::Cosine => {
                let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

                if norm_a == 0.0 || norm_b == 0.0 {
                    return Err(SagittaError::ZeroVector);
                }
                1.0 - (dot / (norm_a * norm_b))
            }
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::DotProduct => {
                -a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f64>()
            }
        };

        Ok(result)
    }

    /// Convert a distance under this metric into a similarity score.
    ///
    /// Higher is more similar. Used by the MMR re-ranker, which trades off
    /// query relevance against similarity to already-selected results.
    pub fn similarity_from_distance(&self, distance: f64) -> f64 {
        match self {
            DistanceMetric::Cosine => 1.0 - distance,
            DistanceMetric::Euclidean => (-distance).exp(),
            DistanceMetric::DotProduct => -distance,
        }
    }

    /// Calculate similarity (higher is more similar) between two vectors.
    pub fn similarity(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        Ok(self.similarity_from_distance(self.distance(a, b)?))
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::DotProduct => "dot_product",
        }
    }

    /// Parse a distance metric from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "dot_product" | "dot" => Ok(DistanceMetric::DotProduct),
            _ => Err(SagittaError::invalid_argument(format!(
                "unknown distance metric: {s}"
            ))),
        }
    }

    /// Stable numeric tag used by the snapshot format.
    pub fn tag(&self) -> u8 {
        match self {
            DistanceMetric::Cosine => 0,
            DistanceMetric::Euclidean => 1,
            DistanceMetric::DotProduct => 2,
        }
    }

    /// Resolve a snapshot tag back to a metric.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(DistanceMetric::Cosine),
            1 => Ok(DistanceMetric::Euclidean),
            2 => Ok(DistanceMetric::DotProduct),
            other => Err(SagittaError::corrupt_snapshot(format!(
                "unknown distance metric tag: {other}"
            ))),
        }
    }

    /// Calculate distances from a query vector to multiple vectors.
    ///
    /// Falls back to a sequential scan below [`PARALLEL_SCAN_THRESHOLD`].
    pub fn batch_distance(&self, query: &[f64], vectors: &[&[f64]]) -> Result<Vec<f64>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        if vectors.len() < PARALLEL_SCAN_THRESHOLD {
            return vectors
                .iter()
                .map(|v| self.distance(query, v))
                .collect::<Result<Vec<_>>>();
        }

        vectors
            .par_iter()
            .map(|v| self.distance(query, v))
            .collect::<Result<Vec<_>>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_distance() {
        let metric = DistanceMetric::Cosine;

        // Identical direction: distance 0.
        let d = metric.distance(&[1.0, 0.0], &[2.0, 0.0]).unwrap();
        assert!(d.abs() < 1e-12);

        // Orthogonal: distance 1.
        let d = metric.distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-12);

        // Opposite: distance 2.
        let d = metric.distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_rejects_zero_vector() {
        let metric = DistanceMetric::Cosine;
        assert!(matches!(
            metric.distance(&[0.0, 0.0], &[1.0, 0.0]),
            Err(SagittaError::ZeroVector)
        ));
    }

    #[test]
    fn test_euclidean_distance() {
        let metric = DistanceMetric::Euclidean;
        let d = metric.distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
        assert_eq!(d, 5.0);
    }

    #[test]
    fn test_dot_product_distance() {
        let metric = DistanceMetric::DotProduct;
        // Higher dot product means smaller (more negative) distance.
        let close = metric.distance(&[1.0, 1.0], &[2.0, 2.0]).unwrap();
        let far = metric.distance(&[1.0, 1.0], &[0.5, 0.5]).unwrap();
        assert!(close < far);
        assert_eq!(close, -4.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let metric = DistanceMetric::Euclidean;
        assert!(matches!(
            metric.distance(&[1.0], &[1.0, 2.0]),
            Err(SagittaError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(
            DistanceMetric::parse_str("cosine").unwrap(),
            DistanceMetric::Cosine
        );
        assert_eq!(
            DistanceMetric::parse_str("L2").unwrap(),
            DistanceMetric::Euclidean
        );
        assert_eq!(
            DistanceMetric::parse_str("dot").unwrap(),
            DistanceMetric::DotProduct
        );
        assert!(DistanceMetric::parse_str("hamming").is_err());
    }

    #[test]
    fn test_tag_round_trip() {
        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::Euclidean,
            DistanceMetric::DotProduct,
        ] {
            assert_eq!(DistanceMetric::from_tag(metric.tag()).unwrap(), metric);
        }
        assert!(DistanceMetric::from_tag(99).is_err());
    }

    #[test]
    fn test_similarity_conversion() {
        let metric = DistanceMetric::Cosine;
        let sim = metric.similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);

        let metric = DistanceMetric::DotProduct;
        let sim = metric.similarity(&[1.0, 1.0], &[2.0, 2.0]).unwrap();
        assert_eq!(sim, 4.0);
    }
}
