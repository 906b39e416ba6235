use std::sync::Arc;

use loris_error::Result;

use crate::cursor::Cursor;
use crate::engine::{Catalog, QueryEngine};
use crate::entity::Entity;
use crate::relation::RelationExpr;
use crate::row::Row;

/// Entry point pairing an engine with source introspection.
///
/// Cursors start as a scan over every column a source exposes; the
/// catalog answers what those columns are. Cloning is cheap and shares
/// both halves.
#[derive(Debug, Clone)]
pub struct Datastore {
    engine: Arc<dyn QueryEngine>,
    catalog: Arc<dyn Catalog>,
}

impl Datastore {
    pub fn new(engine: Arc<dyn QueryEngine>, catalog: Arc<dyn Catalog>) -> Self {
        Datastore { engine, catalog }
    }

    pub fn engine(&self) -> &Arc<dyn QueryEngine> {
        &self.engine
    }

    /// A typed cursor over `T`'s source.
    pub async fn cursor<T: Entity>(&self) -> Result<Cursor<T>> {
        let columns = self.catalog.introspect(T::SOURCE).await?;
        Ok(Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(RelationExpr::scan(T::SOURCE, columns)),
        ))
    }

    /// An untyped cursor over a named source.
    pub async fn source_cursor(&self, source: &str) -> Result<Cursor<Row>> {
        let columns = self.catalog.introspect(source).await?;
        Ok(Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(RelationExpr::scan(source, columns)),
        ))
    }
}
