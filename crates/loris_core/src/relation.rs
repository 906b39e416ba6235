//! The query tree handed to engines.
//!
//! Nodes are immutable; combinators build new nodes around `Arc`-shared
//! children so earlier cursors stay valid. The whole tree serializes with
//! serde, making it the artifact a remote engine receives at session open.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::{Column, Projection};
use crate::value::Value;

/// Conjunction of column equality constraints.
///
/// Names are not checked against any projection here; engines reject
/// restrictions on columns the filtered input does not expose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Restrictions {
    constraints: BTreeMap<String, Value>,
}

impl Restrictions {
    pub fn new() -> Self {
        Restrictions::default()
    }

    /// Add an equality constraint, replacing any prior constraint on the
    /// same column.
    pub fn eq(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.constraints.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for Restrictions {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Restrictions {
            constraints: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub source: String,
    pub projection: Projection,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub restrictions: Restrictions,
    pub input: Arc<RelationExpr>,
    pub projection: Projection,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub left: Arc<RelationExpr>,
    pub right: Arc<RelationExpr>,
    pub projection: Projection,
    pub limit: Option<u64>,
}

/// A relational expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationExpr {
    Scan(Scan),
    Filter(Filter),
    Join(Join),
}

impl RelationExpr {
    /// Leaf node reading every given column of a named source, unbounded.
    pub fn scan(source: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        RelationExpr::Scan(Scan {
            source: source.into(),
            projection: Projection::new(columns),
            limit: None,
        })
    }

    /// Wrap `input` in a filter. The new node exposes the same projection
    /// and row cap as the node it wraps.
    pub fn filter(input: Arc<RelationExpr>, restrictions: Restrictions) -> Self {
        let projection = input.projection().clone();
        let limit = input.limit();
        RelationExpr::Filter(Filter {
            restrictions,
            input,
            projection,
            limit,
        })
    }

    /// Inner join of two trees. The projection is the left tree's columns
    /// followed by the right tree's columns not already named; unbounded.
    pub fn join(left: Arc<RelationExpr>, right: Arc<RelationExpr>) -> Self {
        let projection = left.projection().union(right.projection());
        RelationExpr::Join(Join {
            left,
            right,
            projection,
            limit: None,
        })
    }

    pub fn projection(&self) -> &Projection {
        match self {
            RelationExpr::Scan(n) => &n.projection,
            RelationExpr::Filter(n) => &n.projection,
            RelationExpr::Join(n) => &n.projection,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            RelationExpr::Scan(n) => n.limit,
            RelationExpr::Filter(n) => n.limit,
            RelationExpr::Join(n) => n.limit,
        }
    }

    /// Same node with its projection restricted to the given names,
    /// preserving current order and ignoring unknown names. Children are
    /// shared with the original.
    pub fn with_projection<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Self {
        let mut node = self.clone();
        let restricted = node.projection().restrict(names);
        *node.projection_mut() = restricted;
        node
    }

    /// Same node with its row cap narrowed to `min(n, existing)`. An unset
    /// cap acts as unbounded, so the first call simply sets `n`.
    pub fn with_limit(&self, n: u64) -> Self {
        let mut node = self.clone();
        let narrowed = match node.limit() {
            Some(existing) => existing.min(n),
            None => n,
        };
        *node.limit_mut() = Some(narrowed);
        node
    }

    fn projection_mut(&mut self) -> &mut Projection {
        match self {
            RelationExpr::Scan(n) => &mut n.projection,
            RelationExpr::Filter(n) => &mut n.projection,
            RelationExpr::Join(n) => &mut n.projection,
        }
    }

    fn limit_mut(&mut self) -> &mut Option<u64> {
        match self {
            RelationExpr::Scan(n) => &mut n.limit,
            RelationExpr::Filter(n) => &mut n.limit,
            RelationExpr::Join(n) => &mut n.limit,
        }
    }
}

impl fmt::Display for RelationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationExpr::Scan(n) => write!(f, "scan({})", n.source)?,
            RelationExpr::Filter(n) => write!(f, "filter({})", n.input)?,
            RelationExpr::Join(n) => write!(f, "join({}, {})", n.left, n.right)?,
        }
        if let Some(limit) = self.limit() {
            write!(f, " limit {limit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;

    fn person_scan() -> RelationExpr {
        RelationExpr::scan(
            "person",
            [
                Column::new("id", DataType::Utf8),
                Column::new("name", DataType::Utf8),
                Column::new("country", DataType::Utf8),
            ],
        )
    }

    #[test]
    fn restrictions_replace_prior_constraint_on_a_column() {
        let only = Restrictions::new().eq("country", "US").eq("country", "BR");
        assert_eq!(only.len(), 1);
        assert_eq!(only.iter().next(), Some(("country", &Value::from("BR"))));
        let collected: Restrictions = [("country", Value::from("BR"))].into_iter().collect();
        assert_eq!(only, collected);
        assert!(Restrictions::new().is_empty());
    }

    #[test]
    fn with_projection_preserves_order_and_ignores_unknown() {
        let node = person_scan().with_projection(["country", "id", "nope"]);
        let names: Vec<_> = node.projection().names().collect();
        assert_eq!(names, vec!["id", "country"]);
    }

    #[test]
    fn repeated_projection_of_subset_is_idempotent() {
        let once = person_scan().with_projection(["name"]);
        let twice = person_scan()
            .with_projection(["id", "name"])
            .with_projection(["name"]);
        assert_eq!(once.projection(), twice.projection());
    }

    #[test]
    fn limit_narrows_in_either_order() {
        let a = person_scan().with_limit(5).with_limit(2);
        let b = person_scan().with_limit(2).with_limit(5);
        assert_eq!(a.limit(), Some(2));
        assert_eq!(b.limit(), Some(2));
    }

    #[test]
    fn filter_carries_projection_and_limit_of_input() {
        let input = Arc::new(person_scan().with_projection(["name"]).with_limit(3));
        let node = RelationExpr::filter(Arc::clone(&input), Restrictions::new().eq("name", "Ann"));
        assert_eq!(node.projection(), input.projection());
        assert_eq!(node.limit(), Some(3));
    }

    #[test]
    fn filter_shares_its_input() {
        let input = Arc::new(person_scan());
        let node = RelationExpr::filter(Arc::clone(&input), Restrictions::new());
        match node {
            RelationExpr::Filter(filter) => assert!(Arc::ptr_eq(&filter.input, &input)),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn join_projection_dedups_left_first() {
        let left = Arc::new(person_scan());
        let right = Arc::new(RelationExpr::scan(
            "address",
            [
                Column::new("id", DataType::Utf8),
                Column::new("city", DataType::Utf8),
            ],
        ));
        let node = RelationExpr::join(left, right);
        let names: Vec<_> = node.projection().names().collect();
        assert_eq!(names, vec!["id", "name", "country", "city"]);
        assert_eq!(node.limit(), None);
    }

    #[test]
    fn serde_round_trip_preserves_structure() {
        let expr = RelationExpr::filter(
            Arc::new(person_scan().with_projection(["name", "country"])),
            Restrictions::new().eq("country", "US"),
        )
        .with_limit(1);
        let json = serde_json::to_string(&expr).unwrap();
        let back: RelationExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
