use std::fmt;

use serde::{Deserialize, Serialize};

use crate::datatype::DataType;

/// A single scalar value as returned by an engine or used in a restriction.
///
/// Serializes untagged so that values appear as bare JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Value {
    /// Return the data type this value inhabits, None for null.
    pub fn datatype(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int64(v) => serde_json::Value::from(*v),
            Value::Float64(v) => serde_json::Value::from(*v),
            Value::Utf8(v) => serde_json::Value::from(v.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int64(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Int64(val.into())
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float64(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Utf8(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Utf8(val)
    }
}
