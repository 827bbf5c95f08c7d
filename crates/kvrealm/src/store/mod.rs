//! Key-value store capability.
//!
//! This module defines the narrow interface the caches and the session
//! store need from a backing key-value store, so that the backend can be
//! swapped freely (Redis, in-memory, mock).
//!
//! # Architecture
//!
//! ```text
//! KeyValueStore (trait)   - get / set-with-ttl / del / keys / db_size
//!     └── MemoryStore     - In-process store with per-entry deadlines
//!     └── RedisStore      - Blocking Redis client (feature "redis")
//! ```

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

/// Errors raised by a store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but the command failed.
    #[error("Store command failed: {0}")]
    Command(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Trait for key-value store backends.
///
/// Every call blocks until the store answers. Timeouts, pooling and
/// reconnection belong to the implementation, not to its callers.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the payload stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist or has expired.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Store a payload under `key`.
    ///
    /// An absent `value` stores an empty payload. A `ttl_seconds` of zero
    /// means the entry never expires.
    fn set(&self, key: &[u8], value: Option<&[u8]>, ttl_seconds: u64) -> StoreResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn del(&self, key: &[u8]) -> StoreResult<()>;

    /// List the distinct keys matching a glob `pattern`.
    ///
    /// Callers only rely on a trailing `*` wildcard (`prefix*`).
    fn keys(&self, pattern: &[u8]) -> StoreResult<Vec<Vec<u8>>>;

    /// Number of keys in the whole store, across every namespace.
    fn db_size(&self) -> StoreResult<u64>;
}

/// Whether `key` matches a glob `pattern` with an optional trailing `*`.
pub(crate) fn matches_pattern(pattern: &[u8], key: &[u8]) -> bool {
    match pattern.strip_suffix(b"*") {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_wildcard() {
        assert!(matches_pattern(b"shiro:cache:auth:*", b"shiro:cache:auth:alice"));
        assert!(matches_pattern(b"shiro:cache:auth:*", b"shiro:cache:auth:"));
        assert!(!matches_pattern(b"shiro:cache:auth:*", b"shiro:cache:authz:alice"));
    }

    #[test]
    fn test_exact_pattern() {
        assert!(matches_pattern(b"alice", b"alice"));
        assert!(!matches_pattern(b"alice", b"alice2"));
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        assert!(matches_pattern(b"*", b"anything"));
        assert!(matches_pattern(b"*", b""));
    }
}
