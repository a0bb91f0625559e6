// ── Entity attribute values ──
//
// Snapshot rows carry attributes as JSON. They are converted once, at
// normalization time, into this closed variant so the rest of the engine
// never inspects raw JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Attribute mapping of an entity, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// The attribute payload was present but was not a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attributes must be a mapping, found {found}")]
pub struct UnsupportedAttributes {
    pub found: &'static str,
}

/// Convert a raw attribute payload. `null` is treated as an empty mapping.
pub fn attributes_from_json(value: Value) -> Result<Attributes, UnsupportedAttributes> {
    match value {
        Value::Null => Ok(Attributes::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, AttributeValue::from(v)))
            .collect()),
        Value::Bool(_) => Err(UnsupportedAttributes { found: "a boolean" }),
        Value::Number(_) => Err(UnsupportedAttributes { found: "a number" }),
        Value::String(_) => Err(UnsupportedAttributes { found: "a string" }),
        Value::Array(_) => Err(UnsupportedAttributes { found: "a list" }),
    }
}
