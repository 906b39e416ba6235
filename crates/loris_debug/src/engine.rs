use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use loris_core::engine::{Catalog, QueryEngine, SessionHandle};
use loris_core::relation::RelationExpr;
use loris_core::{Column, Datastore, Restrictions, Row};
use loris_error::{LorisError, Result, internal};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::table::MemoryTable;

/// In-memory engine and catalog over registered tables.
///
/// Sessions evaluate the whole expression eagerly at open into a row
/// queue, then serve one row per fetch. Counters expose how many sessions
/// were opened and closed and how many fetches ran, which is what leak
/// and laziness assertions in tests hang off.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: Mutex<HashMap<String, MemoryTable>>,
    sessions: Mutex<HashMap<SessionHandle, VecDeque<Row>>>,
    next_session: AtomicU64,
    opened: AtomicU64,
    closed: AtomicU64,
    fetches: AtomicU64,
    fail_fetch_after: Mutex<Option<u64>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine::default()
    }

    pub fn with_tables(tables: impl IntoIterator<Item = MemoryTable>) -> Arc<Self> {
        let engine = Arc::new(MemoryEngine::new());
        for table in tables {
            engine.register(table);
        }
        engine
    }

    /// Register a table, replacing any existing table with the same name.
    pub fn register(&self, table: MemoryTable) {
        self.tables.lock().insert(table.name().to_string(), table);
    }

    /// A datastore backed by this engine for both execution and
    /// introspection.
    pub fn datastore(self: &Arc<Self>) -> Datastore {
        Datastore::new(Arc::clone(self) as _, Arc::clone(self) as _)
    }

    /// Make every fetch past the first `n` fail. The fault leaves the
    /// session open; releasing it is still the caller's job.
    pub fn fail_fetch_after(&self, n: u64) {
        *self.fail_fetch_after.lock() = Some(n);
    }

    pub fn sessions_opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> u64 {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Evaluate an expression bottom-up into its full row set. Each node
    /// filters or joins its inputs, then applies its own projection and
    /// row cap.
    fn eval(&self, expr: &RelationExpr) -> Result<Vec<Row>> {
        let mut rows = match expr {
            RelationExpr::Scan(scan) => {
                let tables = self.tables.lock();
                let table = tables.get(&scan.source).ok_or_else(|| {
                    LorisError::session_open(format!("unknown source: {}", scan.source))
                })?;
                table.rows().to_vec()
            }
            RelationExpr::Filter(filter) => {
                for (name, _) in filter.restrictions.iter() {
                    if !filter.input.projection().contains(name) {
                        return Err(LorisError::session_open(format!(
                            "restriction on column not exposed by its input: {name}"
                        )));
                    }
                }
                let input = self.eval(&filter.input)?;
                input
                    .into_iter()
                    .filter(|row| row_matches(row, &filter.restrictions))
                    .collect()
            }
            RelationExpr::Join(join) => {
                let shared: Vec<&str> = join
                    .left
                    .projection()
                    .names()
                    .filter(|name| join.right.projection().contains(name))
                    .collect();
                let left = self.eval(&join.left)?;
                let right = self.eval(&join.right)?;
                join_rows(&left, &right, &shared)
            }
        };
        rows = rows
            .iter()
            .map(|row| row.project(expr.projection().names()))
            .collect();
        if let Some(limit) = expr.limit() {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}

/// Every restriction holds, with strict value equality. A value of the
/// wrong type never matches.
fn row_matches(row: &Row, restrictions: &Restrictions) -> bool {
    restrictions
        .iter()
        .all(|(name, value)| row.get(name) == Some(value))
}

/// Natural join: rows pair up when they agree on every column both sides
/// project; with no shared columns every pair matches. Paired rows merge
/// left-first.
fn join_rows(left: &[Row], right: &[Row], shared: &[&str]) -> Vec<Row> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            let matches = shared.iter().all(|name| l.get(name) == r.get(name));
            if !matches {
                continue;
            }
            let mut merged = l.clone();
            for (name, value) in r.iter() {
                if !merged.contains(name) {
                    merged.insert(name, value.clone());
                }
            }
            out.push(merged);
        }
    }
    out
}

impl QueryEngine for MemoryEngine {
    fn open_session(&self, expr: &RelationExpr) -> BoxFuture<'_, Result<SessionHandle>> {
        // Evaluate before entering the future so the expression borrow
        // ends here; the session is registered only at completion, so a
        // future dropped unpolled leaks nothing.
        let prepared = self.eval(expr);
        let expr_text = expr.to_string();
        Box::pin(async move {
            let rows = prepared?;
            let handle = SessionHandle(self.next_session.fetch_add(1, Ordering::SeqCst) + 1);
            debug!(%handle, expr = %expr_text, rows = rows.len(), "opened session");
            self.sessions.lock().insert(handle, rows.into());
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(handle)
        })
    }

    fn fetch_next(&self, session: SessionHandle) -> BoxFuture<'_, Result<Option<Row>>> {
        Box::pin(async move {
            let prior = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch_after.lock().is_some_and(|after| prior >= after) {
                return Err(LorisError::fetch(format!(
                    "injected fault on fetch {}",
                    prior + 1
                )));
            }
            let mut sessions = self.sessions.lock();
            let queue = sessions
                .get_mut(&session)
                .ok_or_else(|| internal!("fetch on unknown {session}"))?;
            let row = queue.pop_front();
            trace!(%session, hit = row.is_some(), "fetched");
            Ok(row)
        })
    }

    fn close_session(&self, session: SessionHandle) {
        if self.sessions.lock().remove(&session).is_some() {
            self.closed.fetch_add(1, Ordering::SeqCst);
            debug!(%session, "closed session");
        }
    }
}

impl Catalog for MemoryEngine {
    fn introspect(&self, source: &str) -> BoxFuture<'_, Result<Vec<Column>>> {
        let columns = {
            let tables = self.tables.lock();
            tables
                .get(source)
                .map(|table| table.columns().to_vec())
                .ok_or_else(|| LorisError::UnknownSource(source.to_string()))
        };
        Box::pin(async move { columns })
    }
}
