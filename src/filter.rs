//! Metadata filter evaluation.
//!
//! A [`Filter`] is a conjunction of per-field predicates, evaluated against a
//! document's metadata during candidate resolution. The external filter
//! language is JSON: a field maps either to a literal (equality) or to an
//! operator object such as `{"$gt": 3}` or `{"$in": ["a", "b"]}`.
//!
//! A predicate only matches when the field is present in the document's
//! metadata; documents missing the field are excluded, for `$ne` as well.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::{Metadata, MetadataValue};
use crate::error::{Result, SagittaError};

/// A single-field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value.
    Eq(MetadataValue),
    /// Field differs from the value.
    Ne(MetadataValue),
    /// Field is strictly greater than the value.
    Gt(MetadataValue),
    /// Field is greater than or equal to the value.
    Gte(MetadataValue),
    /// Field is strictly less than the value.
    Lt(MetadataValue),
    /// Field is less than or equal to the value.
    Lte(MetadataValue),
    /// Field equals one of the listed values.
    In(Vec<MetadataValue>),
}

impl Predicate {
    /// Evaluate this predicate against a field value.
    pub fn matches(&self, actual: &MetadataValue) -> bool {
        match self {
            Predicate::Eq(expected) => actual == expected,
            Predicate::Ne(expected) => actual != expected,
            Predicate::Gt(expected) => actual.compare(expected) == Some(Ordering::Greater),
            Predicate::Gte(expected) => matches!(
                actual.compare(expected),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            Predicate::Lt(expected) => actual.compare(expected) == Some(Ordering::Less),
            Predicate::Lte(expected) => matches!(
                actual.compare(expected),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
            Predicate::In(values) => values.contains(actual),
        }
    }
}

/// A condition binding a metadata field name to a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The metadata field the predicate applies to.
    pub field: String,
    /// The predicate to evaluate.
    pub predicate: Predicate,
}

/// A conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates an empty filter, which matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from its JSON representation.
    ///
    /// The value must be an object mapping field names to either a scalar
    /// literal (equality) or an operator object. Operator objects may carry
    /// several operators, all of which must hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagitta::filter::Filter;
    ///
    /// let filter = Filter::from_json(&serde_json::json!({
    ///     "source": "news",
    ///     "year": {"$gte": 2020, "$lt": 2025},
    /// })).unwrap();
    /// assert!(!filter.is_empty());
    /// ```
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            SagittaError::unsupported_filter("filter must be a JSON object")
        })?;

        let mut conditions = Vec::new();
        for (field, spec) in object {
            match spec {
                Value::Object(operators) => {
                    if operators.is_empty() {
                        return Err(SagittaError::unsupported_filter(format!(
                            "empty operator object for field '{field}'"
                        )));
                    }
                    for (operator, operand) in operators {
                        conditions.push(Condition {
                            field: field.clone(),
                            predicate: parse_operator(field, operator, operand)?,
                        });
                    }
                }
                literal => conditions.push(Condition {
                    field: field.clone(),
                    predicate: Predicate::Eq(parse_scalar(field, literal)?),
                }),
            }
        }

        Ok(Filter { conditions })
    }

    /// Adds an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::Eq(value.into()),
        });
        self
    }

    /// Adds a greater-than condition.
    pub fn gt(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::Gt(value.into()),
        });
        self
    }

    /// Adds a less-than condition.
    pub fn lt(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::Lt(value.into()),
        });
        self
    }

    /// Adds a membership condition.
    pub fn within(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = MetadataValue>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::In(values.into_iter().collect()),
        });
        self
    }

    /// Whether this filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate this filter against a document's metadata.
    ///
    /// Every condition must hold, and each condition requires its field to be
    /// present.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions.iter().all(|condition| {
            metadata
                .get(&condition.field)
                .map(|actual| condition.predicate.matches(actual))
                .unwrap_or(false)
        })
    }
}

fn parse_operator(field: &str, operator: &str, operand: &Value) -> Result<Predicate> {
    let predicate = match operator {
        "$eq" => Predicate::Eq(parse_scalar(field, operand)?),
        "$ne" => Predicate::Ne(parse_scalar(field, operand)?),
        "$gt" => Predicate::Gt(parse_scalar(field, operand)?),
        "$gte" => Predicate::Gte(parse_scalar(field, operand)?),
        "$lt" => Predicate::Lt(parse_scalar(field, operand)?),
        "$lte" => Predicate::Lte(parse_scalar(field, operand)?),
        "$in" => {
            let values = operand.as_array().ok_or_else(|| {
                SagittaError::unsupported_filter(format!(
                    "$in operand for field '{field}' must be an array"
                ))
            })?;
            Predicate::In(
                values
                    .iter()
                    .map(|value| parse_scalar(field, value))
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        other => {
            return Err(SagittaError::unsupported_filter(format!(
                "unknown operator '{other}' for field '{field}'"
            )));
        }
    };
    Ok(predicate)
}

fn parse_scalar(field: &str, value: &Value) -> Result<MetadataValue> {
    match value {
        Value::Bool(b) => Ok(MetadataValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(MetadataValue::Number).ok_or_else(|| {
            SagittaError::unsupported_filter(format!(
                "numeric operand for field '{field}' is out of range"
            ))
        }),
        Value::String(s) => Ok(MetadataValue::Str(s.clone())),
        other => Err(SagittaError::unsupported_filter(format!(
            "operand for field '{field}' must be a scalar, got {other}"
        ))),
    }
}
