//! The boundary between cursors and whatever actually runs queries.

use std::fmt;

use futures::future::BoxFuture;
use loris_error::Result;

use crate::column::Column;
use crate::relation::RelationExpr;
use crate::row::Row;

/// Opaque identifier for one execution session on an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u64);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session({})", self.0)
    }
}

/// Something that can execute a relation expression row by row.
///
/// A session is opened for one expression, fetched from sequentially, and
/// released exactly once. Callers never issue concurrent requests against
/// the same session.
pub trait QueryEngine: Send + Sync + fmt::Debug {
    /// Start executing `expr`, returning a handle for fetching rows.
    ///
    /// Implementations must not register the session anywhere before the
    /// returned future completes successfully; a future dropped mid-open
    /// must not leak a session.
    fn open_session(&self, expr: &RelationExpr) -> BoxFuture<'_, Result<SessionHandle>>;

    /// Produce the next row of the session, or `None` once exhausted.
    fn fetch_next(&self, session: SessionHandle) -> BoxFuture<'_, Result<Option<Row>>>;

    /// Release the session. Must be idempotent: closing a handle that is
    /// unknown or already closed is a no-op. Runs on every exit path,
    /// including drop, so it cannot suspend or fail.
    fn close_session(&self, session: SessionHandle);
}

/// Source introspection: which columns does a named source expose?
pub trait Catalog: Send + Sync + fmt::Debug {
    fn introspect(&self, source: &str) -> BoxFuture<'_, Result<Vec<Column>>>;
}
