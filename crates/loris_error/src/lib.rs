//! Shared error type for the loris crates.
//!
//! This exists as a separate crate so that engine implementations and the
//! core can agree on one error surface without depending on each other.

#[derive(Debug, thiserror::Error)]
pub enum LorisError {
    /// A builder argument was rejected locally, before any engine
    /// interaction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine rejected a finished query tree when asked to open an
    /// execution session (unknown source, malformed restriction, ...).
    #[error("failed to open query session: {0}")]
    SessionOpen(String),

    /// Row retrieval failed on an already-open session. The session is
    /// closed before this surfaces.
    #[error("failed to fetch next row: {0}")]
    Fetch(String),

    /// Schema introspection did not recognize the source name.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// A row could not be deserialized into the requested entity type.
    #[error("failed to hydrate row: {0}")]
    Hydration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LorisError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LorisError::InvalidArgument(msg.into())
    }

    pub fn session_open(msg: impl Into<String>) -> Self {
        LorisError::SessionOpen(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        LorisError::Fetch(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, LorisError::InvalidArgument(_))
    }

    pub fn is_session_open(&self) -> bool {
        matches!(self, LorisError::SessionOpen(_))
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, LorisError::Fetch(_))
    }
}

pub type Result<T, E = LorisError> = std::result::Result<T, E>;

/// Construct an internal error with format args.
#[macro_export]
macro_rules! internal {
    ($($arg:tt)*) => {
        $crate::LorisError::Internal(std::format!($($arg)*))
    };
}
