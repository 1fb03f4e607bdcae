/// Errors from world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Keys must be non-empty.
    #[error("key must not be empty")]
    EmptyKey,

    /// The predicate query could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The state database does not support the requested capability.
    #[error("unsupported by this state database: {0}")]
    Unsupported(&'static str),

    /// `next_item` or `close` was called on a closed cursor.
    #[error("cursor already closed")]
    CursorClosed,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The world state rejects writes.
    #[error("world state is read-only")]
    ReadOnly,

    /// Failure inside the backing ledger.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for world-state operations.
pub type StateResult<T> = Result<T, StateError>;
