//! Typed views over raw rows.

use loris_error::{LorisError, Result};
use serde::de::DeserializeOwned;

use crate::row::Row;

/// A named source with a typed row shape.
///
/// Hydration deserializes a row's columns into the implementing type, so
/// entities are ordinary deserializable structs. Columns missing from a
/// row fall back to the entity's serde defaults; entities that tolerate
/// partial rows should opt in with `#[serde(default)]`. Row columns with
/// no matching field are ignored.
///
/// ```
/// use loris_core::Entity;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct Person {
///     id: String,
///     name: String,
///     country: String,
/// }
///
/// impl Entity for Person {
///     const SOURCE: &'static str = "person";
/// }
/// ```
pub trait Entity: DeserializeOwned {
    /// Name of the source this entity reads from.
    const SOURCE: &'static str;
}

/// Deserialize a raw row into `T`. No value coercion happens; a column
/// whose value does not fit the target field is a hydration error.
pub fn hydrate<T: Entity>(row: &Row) -> Result<T> {
    serde_json::from_value(row.to_json()).map_err(|e| LorisError::Hydration(e.to_string()))
}
