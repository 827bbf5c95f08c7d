//! Error types for cache and session operations.

use crate::codec::SerializationError;
use crate::store::StoreError;

/// Error type for namespaced cache operations.
///
/// This is the generic cache error surfaced to the host framework for
/// single-entry reads, writes and removals.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A key or value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The backing store rejected or failed the request.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session or its identifier was absent on a write path.
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// The session could not be encoded or decoded.
    #[error("Session serialization failed for '{session_id}': {source}")]
    Serialization {
        session_id: String,
        #[source]
        source: SerializationError,
    },

    /// The backing store rejected or failed the request.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Whether the host should treat this as an unknown/invalid session.
    ///
    /// Every session error surfaces to the host as this condition, store
    /// outages included. Use [`is_store_unavailable`](Self::is_store_unavailable)
    /// to tell an outage apart before deciding to retry.
    pub fn is_unknown_session(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownSession(_)
                | SessionError::Serialization { .. }
                | SessionError::Store(_)
        )
    }

    /// Whether the store could not be reached.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, SessionError::Store(StoreError::Unavailable(_)))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;
