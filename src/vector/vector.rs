//! Validation helpers over raw vector slices.

use crate::error::{Result, SagittaError};
use crate::vector::distance::DistanceMetric;

/// Calculate the L2 norm (magnitude) of a vector.
pub fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Check whether a vector contains only finite values.
pub fn is_finite(vector: &[f64]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

/// Validate a vector's length against an expected dimension.
pub fn ensure_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SagittaError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Validate a vector for storage or querying under the given metric.
///
/// Rejects non-finite components, empty vectors, and zero-norm vectors under
/// the cosine metric (cosine distance is undefined there).
pub fn ensure_valid(vector: &[f64], metric: DistanceMetric) -> Result<()> {
    if vector.is_empty() {
        return Err(SagittaError::invalid_argument("vector must not be empty"));
    }
    if !is_finite(vector) {
        return Err(SagittaError::invalid_argument(
            "vector contains NaN or infinite values",
        ));
    }
    if metric == DistanceMetric::Cosine && norm(vector) == 0.0 {
        return Err(SagittaError::ZeroVector);
    }
    Ok(())
}
