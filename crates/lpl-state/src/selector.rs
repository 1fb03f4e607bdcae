//! Predicate queries.
//!
//! A query is a JSON document `{"selector": {field: value, ...}}` matching
//! records whose top-level fields equal every listed value, or one of the
//! values of an `{"$in": [...]}` condition. Queries are always
//! built whole through [`Selector`] and [`QueryString`] before being
//! serialized for the world state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StateError, StateResult};

/// Field-equality conditions, all of which must hold.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(BTreeMap<String, Value>);

impl Selector {
    /// An empty selector matching every JSON object.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector on the `docType` discriminator.
    pub fn doc_type(doc_type: impl Into<String>) -> Self {
        let doc_type: String = doc_type.into();
        Self::new().with("docType", doc_type)
    }

    /// Add an equality condition on `field`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Add a condition on `field` satisfied by any of `values`.
    pub fn with_any<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let condition = match <[Value; 1]>::try_from(values) {
            Ok([single]) => single,
            Err(values) => serde_json::json!({ "$in": values }),
        };
        self.0.insert(field.into(), condition);
        self
    }

    /// Whether `record` satisfies every condition.
    ///
    /// A condition written as `{"$eq": v}` is equivalent to `v`;
    /// `{"$in": [a, b]}` holds when the field equals any listed value.
    /// Non-object records never match.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(fields) = record.as_object() else {
            return false;
        };
        self.0.iter().all(|(field, expected)| {
            let Some(actual) = fields.get(field) else {
                return false;
            };
            match expected {
                Value::Object(op) if op.len() == 1 => match op.iter().next() {
                    Some((name, value)) if name == "$eq" => actual == value,
                    Some((name, Value::Array(values))) if name == "$in" => values.contains(actual),
                    _ => actual == expected,
                },
                other => actual == other,
            }
        })
    }
}

/// The full predicate document handed to the world state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryString {
    pub selector: Selector,
}

impl QueryString {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> StateResult<String> {
        serde_json::to_string(self).map_err(|e| StateError::Serialization(e.to_string()))
    }

    /// Parse the wire form. A missing `selector` is rejected.
    pub fn from_json(query: &str) -> StateResult<Self> {
        serde_json::from_str(query).map_err(|e| StateError::InvalidQuery(e.to_string()))
    }
}

impl From<Selector> for QueryString {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}
