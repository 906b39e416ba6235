//! Fluent construction of relation expressions plus the terminal
//! operations that execute them.
//!
//! A cursor is a value: combinators return new cursors sharing the
//! existing tree, and nothing reaches the engine until a terminal
//! operation or [`Cursor::stream`] is driven.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;
use loris_error::{LorisError, Result};

use crate::column::Projection;
use crate::engine::QueryEngine;
use crate::entity::{self, Entity};
use crate::relation::{RelationExpr, Restrictions};
use crate::row::Row;
use crate::stream::RowStream;

/// A lazy query over one engine.
///
/// `T` is the hydration target for typed terminal operations. `select` and
/// `join` change the row shape, so they discard the tag and hand back a
/// `Cursor<Row>`; [`Cursor::with_entity`] re-types one when the caller has
/// a matching entity.
pub struct Cursor<T = Row> {
    engine: Arc<dyn QueryEngine>,
    expr: Arc<RelationExpr>,
    entity: PhantomData<fn() -> T>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(engine: Arc<dyn QueryEngine>, expr: Arc<RelationExpr>) -> Self {
        Cursor {
            engine,
            expr,
            entity: PhantomData,
        }
    }

    pub fn expr(&self) -> &RelationExpr {
        &self.expr
    }

    pub fn projection(&self) -> &Projection {
        self.expr.projection()
    }

    pub fn limit(&self) -> Option<u64> {
        self.expr.limit()
    }

    /// Restrict the cursor to the named columns, in the cursor's current
    /// column order. Unknown names are silently ignored; the result is a
    /// partial view, so it is untyped.
    pub fn select<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Cursor<Row> {
        Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(self.expr.with_projection(names)),
        )
    }

    /// Keep only rows matching every restriction. Restriction names are
    /// not checked here; the engine rejects unknown ones at open.
    pub fn filter(&self, restrictions: Restrictions) -> Cursor<T> {
        Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(RelationExpr::filter(Arc::clone(&self.expr), restrictions)),
        )
    }

    /// Cap the number of rows produced. Caps never widen: the effective
    /// cap is the minimum across every `take` applied. `n` must be
    /// positive.
    pub fn take(&self, n: u64) -> Result<Cursor<T>> {
        if n == 0 {
            return Err(LorisError::invalid_argument(
                "take requires a positive row count",
            ));
        }
        Ok(Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(self.expr.with_limit(n)),
        ))
    }

    /// Inner-join this cursor with another. The joined columns are this
    /// cursor's followed by the other's not already named; the combined
    /// shape has no entity, so the result is untyped. Executes on this
    /// cursor's engine.
    pub fn join<U>(&self, other: &Cursor<U>) -> Cursor<Row> {
        Cursor::new(
            Arc::clone(&self.engine),
            Arc::new(RelationExpr::join(
                Arc::clone(&self.expr),
                Arc::clone(&other.expr),
            )),
        )
    }

    /// Re-type the cursor, typically after a join when the caller has an
    /// entity matching the combined shape.
    pub fn with_entity<U: Entity>(&self) -> Cursor<U> {
        Cursor::new(Arc::clone(&self.engine), Arc::clone(&self.expr))
    }

    /// Begin execution. The stream opens its session on first poll.
    pub fn stream(&self) -> RowStream {
        RowStream::new(Arc::clone(&self.engine), Arc::clone(&self.expr))
    }

    /// Drain the cursor into raw rows.
    pub async fn collect_rows(&self) -> Result<Vec<Row>> {
        let mut stream = self.stream();
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Run `f` on each raw row. A callback failure releases the session
    /// and then propagates.
    pub async fn try_for_each_row<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(Row) -> Result<()>,
    {
        let mut stream = self.stream();
        while let Some(row) = stream.next().await {
            if let Err(e) = f(row?) {
                stream.close();
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<T: Entity> Cursor<T> {
    /// Drain the cursor, hydrating every row.
    pub async fn collect(&self) -> Result<Vec<T>> {
        let mut stream = self.stream();
        let mut entities = Vec::new();
        while let Some(row) = stream.next().await {
            match entity::hydrate(&row?) {
                Ok(e) => entities.push(e),
                Err(e) => {
                    stream.close();
                    return Err(e);
                }
            }
        }
        Ok(entities)
    }

    /// Run `f` on each hydrated entity. A hydration or callback failure
    /// releases the session and then propagates.
    pub async fn try_for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T) -> Result<()>,
    {
        let mut stream = self.stream();
        while let Some(row) = stream.next().await {
            let hydrated = match entity::hydrate::<T>(&row?) {
                Ok(e) => e,
                Err(e) => {
                    stream.close();
                    return Err(e);
                }
            };
            if let Err(e) = f(hydrated) {
                stream.close();
                return Err(e);
            }
        }
        Ok(())
    }

    /// The first entity, if any. Narrows the cap to one row, so the
    /// session ends without draining the rest.
    pub async fn first(&self) -> Result<Option<T>> {
        let expr = Arc::new(self.expr.with_limit(1));
        let mut stream = RowStream::new(Arc::clone(&self.engine), expr);
        match stream.next().await.transpose()? {
            Some(row) => Ok(Some(entity::hydrate(&row)?)),
            None => Ok(None),
        }
    }
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Cursor {
            engine: Arc::clone(&self.engine),
            expr: Arc::clone(&self.expr),
            entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}
