//! Row-at-a-time execution of a finished relation expression.
//!
//! `RowStream` owns the execution session: it opens one lazily on first
//! poll, drives one fetch at a time, and releases the session exactly once
//! on every exit path. Exhaustion, a fetch failure, an explicit [`close`],
//! and plain dropping of the stream all release the session; a failed open
//! never acquires one.
//!
//! [`close`]: RowStream::close

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::future::BoxFuture;
use loris_error::Result;

use crate::engine::{QueryEngine, SessionHandle};
use crate::relation::RelationExpr;
use crate::row::Row;

enum StreamState {
    /// No session yet. Nothing has reached the engine.
    Unopened,
    /// Open request in flight. The session does not exist until the future
    /// completes, so dropping here releases nothing.
    Opening(BoxFuture<'static, Result<SessionHandle>>),
    /// Session open, no request in flight.
    Idle {
        session: SessionHandle,
        /// Rows still allowed out under the expression's cap. `None` is
        /// unbounded.
        remaining: Option<u64>,
    },
    /// Fetch request in flight.
    Fetching {
        session: SessionHandle,
        remaining: Option<u64>,
        fut: BoxFuture<'static, Result<Option<Row>>>,
    },
    /// Session released (or never acquired). Absorbing; polls yield `None`.
    Closed,
}

impl fmt::Debug for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Unopened => write!(f, "Unopened"),
            StreamState::Opening(_) => write!(f, "Opening"),
            StreamState::Idle { session, remaining } => f
                .debug_struct("Idle")
                .field("session", session)
                .field("remaining", remaining)
                .finish(),
            StreamState::Fetching { session, .. } => {
                f.debug_struct("Fetching").field("session", session).finish()
            }
            StreamState::Closed => write!(f, "Closed"),
        }
    }
}

/// Stream of rows for one relation expression.
///
/// Yields rows in engine order with a single request in flight at a time.
/// A fetch error closes the session first and then surfaces as the final
/// item. After any terminal transition further polls return `None`.
pub struct RowStream {
    engine: Arc<dyn QueryEngine>,
    expr: Arc<RelationExpr>,
    state: StreamState,
}

impl RowStream {
    pub fn new(engine: Arc<dyn QueryEngine>, expr: Arc<RelationExpr>) -> Self {
        RowStream {
            engine,
            expr,
            state: StreamState::Unopened,
        }
    }

    pub fn expr(&self) -> &RelationExpr {
        &self.expr
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, StreamState::Closed)
    }

    /// Terminate early. Releases the session if one is open; safe to call
    /// any number of times, in any state.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, StreamState::Closed) {
            StreamState::Idle { session, .. } | StreamState::Fetching { session, .. } => {
                self.engine.close_session(session);
            }
            StreamState::Unopened | StreamState::Opening(_) | StreamState::Closed => {}
        }
    }
}

impl Stream for RowStream {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            match &mut this.state {
                StreamState::Unopened => {
                    // A zero cap can only come from hand-built expressions,
                    // but it means "no rows" either way. Skip the open.
                    if this.expr.limit() == Some(0) {
                        this.state = StreamState::Closed;
                        return Poll::Ready(None);
                    }
                    let engine = Arc::clone(&this.engine);
                    let expr = Arc::clone(&this.expr);
                    this.state = StreamState::Opening(Box::pin(async move {
                        engine.open_session(&expr).await
                    }));
                }
                StreamState::Opening(fut) => match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(session)) => {
                        this.state = StreamState::Idle {
                            session,
                            remaining: this.expr.limit(),
                        };
                    }
                    Poll::Ready(Err(e)) => {
                        this.state = StreamState::Closed;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                StreamState::Idle { session, remaining } => {
                    let session = *session;
                    let remaining = *remaining;
                    let engine = Arc::clone(&this.engine);
                    this.state = StreamState::Fetching {
                        session,
                        remaining,
                        fut: Box::pin(async move { engine.fetch_next(session).await }),
                    };
                }
                StreamState::Fetching {
                    session,
                    remaining,
                    fut,
                } => {
                    let session = *session;
                    let remaining = *remaining;
                    match fut.as_mut().poll(cx) {
                        Poll::Ready(Ok(Some(row))) => {
                            match remaining {
                                // Cap reached with this row: release now,
                                // no further fetch goes out.
                                Some(1) => {
                                    this.engine.close_session(session);
                                    this.state = StreamState::Closed;
                                }
                                Some(n) => {
                                    this.state = StreamState::Idle {
                                        session,
                                        remaining: Some(n - 1),
                                    };
                                }
                                None => {
                                    this.state = StreamState::Idle {
                                        session,
                                        remaining: None,
                                    };
                                }
                            }
                            return Poll::Ready(Some(Ok(row)));
                        }
                        Poll::Ready(Ok(None)) => {
                            this.engine.close_session(session);
                            this.state = StreamState::Closed;
                            return Poll::Ready(None);
                        }
                        Poll::Ready(Err(e)) => {
                            // Close before the error surfaces so a caller
                            // that bails on the first error leaks nothing.
                            this.engine.close_session(session);
                            this.state = StreamState::Closed;
                            return Poll::Ready(Some(Err(e)));
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }
                StreamState::Closed => return Poll::Ready(None),
            }
        }
    }
}

impl Drop for RowStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("expr", &self.expr)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
