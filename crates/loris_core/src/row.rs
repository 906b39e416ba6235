use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A single result row, mapping column names to values.
///
/// Insertion order is preserved so a row prints in the order the engine
/// produced its columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Row {
            values: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop every column not named, keeping this row's column order.
    pub fn project<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Row {
        let keep: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        Row {
            values: self
                .values
                .iter()
                .filter(|(name, _)| keep.contains(*name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            values: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Row {
    fn from(pairs: [(&str, Value); N]) -> Self {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (name, value)) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut row = Row::new();
        row.insert("name", "Ann");
        assert_eq!(row.len(), 1);
        assert!(row.contains("name"));
        assert_eq!(row.get("name"), Some(&Value::from("Ann")));
    }

    #[test]
    fn project_keeps_row_order() {
        let row = Row::from([
            ("id", Value::from("p1")),
            ("name", Value::from("Ann")),
            ("country", Value::from("US")),
        ]);
        let projected = row.project(["country", "name"]);
        let names: Vec<_> = projected.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["name", "country"]);
        assert!(row.project(["missing"]).is_empty());
    }

    #[test]
    fn serializes_as_plain_object() {
        let row = Row::from([("name", Value::from("Ann")), ("age", Value::from(42))]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"name":"Ann","age":42}"#);
    }

    #[test]
    fn deserializes_from_plain_object() {
        let row: Row = serde_json::from_str(r#"{"name":"Ann","age":42}"#).unwrap();
        assert_eq!(row.get("name"), Some(&Value::Utf8("Ann".to_string())));
        assert_eq!(row.get("age"), Some(&Value::Int64(42)));
    }
}
