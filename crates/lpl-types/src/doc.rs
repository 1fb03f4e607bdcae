use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator stored on every record. Contracts and transactions share a
/// single keyspace, so predicate queries select on this field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Contract,
    Transaction,
}

impl DocType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a record as JSON with object keys in sorted order.
///
/// Peers executing the same invocation must write byte-identical values, so
/// records are routed through [`serde_json::Value`], whose maps are ordered.
pub fn canonical_json<T: Serialize>(record: &T) -> Result<Vec<u8>, crate::TypeError> {
    let value =
        serde_json::to_value(record).map_err(|e| crate::TypeError::Serialization(e.to_string()))?;
    serde_json::to_vec(&value).map_err(|e| crate::TypeError::Serialization(e.to_string()))
}
