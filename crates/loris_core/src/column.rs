use std::fmt;

use serde::{Deserialize, Serialize};

use crate::datatype::DataType;

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Column {
            name: name.into(),
            datatype,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.datatype)
    }
}

/// The ordered set of columns a relation node exposes.
///
/// Names are unique; on construction duplicates are dropped keeping the
/// first occurrence. Order is insertion order and matters for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    columns: Vec<Column>,
}

impl Projection {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut out: Vec<Column> = Vec::new();
        for column in columns {
            if !out.iter().any(|c| c.name == column.name) {
                out.push(column);
            }
        }
        Projection { columns: out }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Keep only the named columns, preserving this projection's order.
    ///
    /// Names not present in the projection are silently ignored.
    pub fn restrict<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Self {
        let keep: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        Projection {
            columns: self
                .columns
                .iter()
                .filter(|c| keep.contains(&c.name))
                .cloned()
                .collect(),
        }
    }

    /// Columns of self in order, then columns of `other` whose names are
    /// not already present.
    pub fn union(&self, other: &Projection) -> Self {
        let mut out = self.columns.clone();
        for column in &other.columns {
            if !out.iter().any(|c| c.name == column.name) {
                out.push(column.clone());
            }
        }
        Projection { columns: out }
    }
}

impl FromIterator<Column> for Projection {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Projection::new(iter)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Projection {
        Projection::new([
            Column::new("id", DataType::Utf8),
            Column::new("name", DataType::Utf8),
            Column::new("country", DataType::Utf8),
        ])
    }

    #[test]
    fn new_dedups_by_name_first_wins() {
        let proj = Projection::new([
            Column::new("id", DataType::Utf8),
            Column::new("id", DataType::Int64),
            Column::new("name", DataType::Utf8),
        ]);
        assert_eq!(proj.len(), 2);
        assert_eq!(proj.get("id").unwrap().datatype, DataType::Utf8);
        assert_eq!(proj.columns()[1].name, "name");
    }

    #[test]
    fn restrict_preserves_projection_order() {
        let proj = person().restrict(["country", "id"]);
        let names: Vec<_> = proj.names().collect();
        assert_eq!(names, vec!["id", "country"]);
    }

    #[test]
    fn restrict_drops_unknown_names() {
        let proj = person().restrict(["name", "age"]);
        let names: Vec<_> = proj.names().collect();
        assert_eq!(names, vec!["name"]);
        assert!(person().restrict(["age"]).is_empty());
    }

    #[test]
    fn restrict_is_idempotent() {
        let once = person().restrict(["name"]);
        let twice = person().restrict(["name", "id"]).restrict(["name"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn union_dedups_left_first() {
        let left = person();
        let right: Projection = [
            Column::new("id", DataType::Utf8),
            Column::new("city", DataType::Utf8),
        ]
        .into_iter()
        .collect();
        let joined = left.union(&right);
        let names: Vec<_> = joined.names().collect();
        assert_eq!(names, vec!["id", "name", "country", "city"]);
    }

    #[test]
    fn display_lists_name_and_type() {
        let proj = person().restrict(["id", "country"]);
        assert_eq!(proj.to_string(), "[id UTF8, country UTF8]");
    }
}
