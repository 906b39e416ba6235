//! Loris provides client-side query construction and lazy execution
//! against a remote relational store.
//!
//! # Cursors
//!
//! Application code describes the rows it wants through a [`Cursor`]:
//! `select` restricts columns, `filter` keeps matching rows, `take` caps
//! the row count, and `join` combines two cursors. Every combinator
//! returns a new cursor and leaves the old one usable; the underlying
//! trees share structure, so building a long chain stays cheap. None of
//! this touches the network.
//!
//! # The relation expression
//!
//! What a cursor accumulates is a [`relation::RelationExpr`]: a small,
//! serializable tree of scan, filter, and join nodes, each exposing a
//! column projection and an optional row cap. The tree is the complete
//! description of the query and the only thing an engine ever receives.
//!
//! # Execution
//!
//! Terminal operations (or [`Cursor::stream`]) hand the finished tree to
//! a [`QueryEngine`] and drive a row-at-a-time session: open once, fetch
//! sequentially, close exactly once. Closing is tied to the stream value
//! itself, so abandoning a stream mid-iteration still releases the
//! remote session.
//!
//! # Hydration
//!
//! Rows come back as ordered name/value maps ([`Row`]). A cursor typed
//! with an [`Entity`] deserializes each row into that type, filling
//! columns the row lacks with the entity's defaults; untyped cursors
//! hand rows through unchanged.

pub mod column;
pub mod cursor;
pub mod datastore;
pub mod datatype;
pub mod engine;
pub mod entity;
pub mod relation;
pub mod row;
pub mod stream;
pub mod value;

pub use column::{Column, Projection};
pub use cursor::Cursor;
pub use datastore::Datastore;
pub use datatype::DataType;
pub use engine::{Catalog, QueryEngine, SessionHandle};
pub use entity::Entity;
pub use relation::{RelationExpr, Restrictions};
pub use row::Row;
pub use stream::RowStream;
pub use value::Value;
