//! Collection configuration.

use serde::{Deserialize, Serialize};

use crate::vector::DistanceMetric;

/// Configuration for creating or opening a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name, unique within a manager.
    pub name: String,
    /// Distance metric used for ranking. Fixed for the collection's lifetime.
    pub metric: DistanceMetric,
    /// Optional expected dimension. When set, the first add must match it;
    /// when unset, the first added vector fixes the dimension.
    pub dimension_hint: Option<usize>,
}

impl CollectionConfig {
    /// Creates a configuration with the given name and the default metric.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric: DistanceMetric::default(),
            dimension_hint: None,
        }
    }

    /// Sets the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the expected dimension.
    pub fn with_dimension_hint(mut self, dimension: usize) -> Self {
        self.dimension_hint = Some(dimension);
        self
    }
}
