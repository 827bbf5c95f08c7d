//! Settings for caches and the session store.

use std::time::Duration;

use tracing::warn;

/// Default key prefix for caches. The cache name and `:` are appended.
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "shiro:cache:";

/// Default key prefix for persisted sessions.
pub const DEFAULT_SESSION_KEY_PREFIX: &str = "shiro:session:";

/// Default store TTL in seconds.
pub const DEFAULT_EXPIRE_SECS: u64 = 1800;

/// TTL value meaning "keep the current setting" when passed at construction.
pub const RETAIN_EXPIRE: i64 = -1;

/// Default lifetime of a read memo entry.
///
/// A login reads the same session about ten times in quick succession;
/// one second comfortably covers a single request.
pub const DEFAULT_SESSION_IN_MEMORY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default upper bound on entries held by one read memo.
pub const DEFAULT_MEMO_MAX_ENTRIES: usize = 1024;

/// Resolve a requested TTL against the current one.
fn resolve_ttl(current: u64, requested: i64) -> u64 {
    match u64::try_from(requested) {
        Ok(ttl) => ttl,
        Err(_) => {
            if requested != RETAIN_EXPIRE {
                warn!(requested, current, "Negative expire ignored, keeping current TTL");
            }
            current
        }
    }
}

/// Settings shared by every cache built from one registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Global prefix; each cache appends `<name>:` to it.
    pub key_prefix: String,

    /// TTL in seconds for every write. Zero means no expiry.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
            ttl_seconds: DEFAULT_EXPIRE_SECS,
        }
    }
}

impl CacheSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global key prefix. An empty prefix keeps the current one.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.key_prefix = prefix;
        }
        self
    }

    /// Set the TTL in seconds. [`RETAIN_EXPIRE`] keeps the current TTL.
    pub fn with_ttl_seconds(mut self, ttl: i64) -> Self {
        self.ttl_seconds = resolve_ttl(self.ttl_seconds, ttl);
        self
    }
}

/// Settings for the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Prefix prepended to every session id.
    pub key_prefix: String,

    /// TTL in seconds for every session write. Zero means no expiry.
    ///
    /// Keep this longer than the sessions' own timeout, or the store may
    /// drop a session the host still considers live.
    pub ttl_seconds: u64,

    /// How long a read memo entry stays valid.
    pub in_memory_timeout: Duration,

    /// Maximum number of sessions one read memo holds.
    pub memo_max_entries: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_SESSION_KEY_PREFIX.to_string(),
            ttl_seconds: DEFAULT_EXPIRE_SECS,
            in_memory_timeout: DEFAULT_SESSION_IN_MEMORY_TIMEOUT,
            memo_max_entries: DEFAULT_MEMO_MAX_ENTRIES,
        }
    }
}

impl SessionSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session key prefix. An empty prefix keeps the current one.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.key_prefix = prefix;
        }
        self
    }

    /// Set the TTL in seconds. [`RETAIN_EXPIRE`] keeps the current TTL.
    pub fn with_ttl_seconds(mut self, ttl: i64) -> Self {
        self.ttl_seconds = resolve_ttl(self.ttl_seconds, ttl);
        self
    }

    /// Set how long read memo entries stay valid.
    pub fn with_in_memory_timeout(mut self, timeout: Duration) -> Self {
        self.in_memory_timeout = timeout;
        self
    }

    /// Set the read memo capacity. Zero is raised to one.
    pub fn with_memo_max_entries(mut self, max: usize) -> Self {
        self.memo_max_entries = max.max(1);
        self
    }
}
