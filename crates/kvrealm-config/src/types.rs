//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [cache]
//! key_prefix = "shiro:cache:"
//! expire = 1800
//!
//! [session]
//! key_prefix = "shiro:session:"
//! expire = 1800
//! in_memory_timeout_ms = 1000
//! memo_max_entries = 1024
//!
//! [store]
//! url = "redis://127.0.0.1:6379"
//! ```
//!
//! Every field is optional. `expire = -1` means "use the default".

use std::time::Duration;

use kvrealm::{CacheSettings, RETAIN_EXPIRE, SessionSettings};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default store connection URL.
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvRealmConfig {
    /// Cache registry settings.
    pub cache: CacheSection,

    /// Session store settings.
    pub session: SessionSection,

    /// Backing store connection.
    pub store: StoreSection,
}

impl KvRealmConfig {
    /// Create an empty config (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validated settings for a cache registry.
    pub fn to_cache_settings(&self) -> Result<CacheSettings> {
        self.cache.to_settings()
    }

    /// Validated settings for a session store.
    pub fn to_session_settings(&self) -> Result<SessionSettings> {
        self.session.to_settings()
    }
}

fn check_expire(section: &str, expire: Option<i64>) -> Result<i64> {
    match expire {
        None => Ok(RETAIN_EXPIRE),
        Some(value) if value < RETAIN_EXPIRE => Err(ConfigError::InvalidTtl {
            section: section.to_string(),
            value,
        }),
        Some(value) => Ok(value),
    }
}

/// The `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Global prefix for cache keys.
    pub key_prefix: Option<String>,

    /// Store TTL in seconds.
    pub expire: Option<i64>,
}

impl CacheSection {
    /// Convert into validated core settings.
    pub fn to_settings(&self) -> Result<CacheSettings> {
        let expire = check_expire("cache", self.expire)?;
        Ok(CacheSettings::new()
            .with_key_prefix(self.key_prefix.clone().unwrap_or_default())
            .with_ttl_seconds(expire))
    }
}

/// The `[session]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Prefix for session keys.
    pub key_prefix: Option<String>,

    /// Store TTL in seconds. Keep it longer than the session timeout.
    pub expire: Option<i64>,

    /// Read memo entry lifetime in milliseconds.
    pub in_memory_timeout_ms: Option<u64>,

    /// Read memo capacity.
    pub memo_max_entries: Option<usize>,
}

impl SessionSection {
    /// Convert into validated core settings.
    pub fn to_settings(&self) -> Result<SessionSettings> {
        let expire = check_expire("session", self.expire)?;
        let mut settings = SessionSettings::new()
            .with_key_prefix(self.key_prefix.clone().unwrap_or_default())
            .with_ttl_seconds(expire);

        if let Some(ms) = self.in_memory_timeout_ms {
            settings = settings.with_in_memory_timeout(Duration::from_millis(ms));
        }
        if let Some(max) = self.memo_max_entries {
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    section: "session".to_string(),
                    field: "memo_max_entries".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            settings = settings.with_memo_max_entries(max);
        }
        Ok(settings)
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Connection URL for the backing store.
    pub url: Option<String>,
}

impl StoreSection {
    /// The configured URL, or [`DEFAULT_STORE_URL`].
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_STORE_URL)
    }
}
