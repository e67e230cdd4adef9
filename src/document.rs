//! Document model for vector collections.
//!
//! A [`Document`] is the stored unit of a collection: a unique id, the
//! original text, the embedded vector, and a map of metadata fields.
//! [`DocumentPayload`] is the ingestion-side input, where the id and the
//! vector may be omitted (the id is generated, the vector is produced by the
//! collection's embedder).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata attached to a document: an ordered map of field name to scalar.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A scalar metadata value.
///
/// Metadata is deliberately closed over three scalar types so that filter
/// evaluation stays exhaustively matchable. The serde representation is
/// untagged, so JSON metadata maps read naturally
/// (`{"source": "news", "year": 2024, "draft": false}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean value.
    Bool(bool),
    /// Numeric value. Integers are widened to `f64`.
    Number(f64),
    /// String value.
    Str(String),
}

impl MetadataValue {
    /// Compare two values of the same kind.
    ///
    /// Returns `None` for cross-type comparisons and for booleans, which
    /// support equality only. Range filters rely on this: a `$gt` predicate
    /// against a value of a different type never matches.
    pub fn compare(&self, other: &MetadataValue) -> Option<Ordering> {
        match (self, other) {
            (MetadataValue::Number(a), MetadataValue::Number(b)) => a.partial_cmp(b),
            (MetadataValue::Str(a), MetadataValue::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Get the name of this value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MetadataValue::Bool(_) => "bool",
            MetadataValue::Number(_) => "number",
            MetadataValue::Str(_) => "string",
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::Number(n)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Number(n as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

/// A stored document: id, original text, embedded vector, and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id within the collection.
    pub id: String,
    /// The original (pre-embedded) text.
    pub text: String,
    /// The embedded vector. Length equals the collection's fixed dimension.
    pub vector: Vec<f64>,
    /// Metadata fields.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Ingestion input for [`add`](crate::collection::Collection::add) and
/// [`update`](crate::collection::Collection::update).
///
/// The id may be omitted on add (a UUID is assigned). The vector may be
/// omitted when the collection was opened with an embedder, in which case the
/// text is embedded during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Caller-supplied id, or `None` to have one generated.
    #[serde(default)]
    pub id: Option<String>,
    /// The document text.
    pub text: String,
    /// Pre-computed embedding, or `None` to embed the text.
    #[serde(default)]
    pub vector: Option<Vec<f64>>,
    /// Metadata fields.
    #[serde(default)]
    pub metadata: Metadata,
}

impl DocumentPayload {
    /// Creates a payload with the given text and no id, vector, or metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets the document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the pre-computed embedding.
    pub fn with_vector(mut self, vector: Vec<f64>) -> Self {
        self.vector = Some(vector);
        self
    }

    /// Sets a metadata field.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
