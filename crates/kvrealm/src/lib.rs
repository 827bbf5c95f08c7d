//! Namespaced caches and session persistence over a key-value store.
//!
//! This crate turns a flat, byte-oriented key-value store into:
//! - Isolated, typed, expiring caches, one namespace per cache name
//! - A session repository with a request-scoped read memo
//! - Stable keys for composite identities (sorted realm names)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kvrealm::{CacheKey, CacheRegistry, CacheSettings, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let registry = CacheRegistry::<String>::new(store, CacheSettings::default());
//!
//! let auth = registry.get_cache("auth");
//! let key = CacheKey::from("alice");
//! auth.put(Some(&key), Some("ROLE_ADMIN".to_string()))?;
//! assert_eq!(auth.get(Some(&key))?.as_deref(), Some("ROLE_ADMIN"));
//! # Ok::<(), kvrealm::CacheError>(())
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod registry;
pub mod session;
pub mod store;

pub use cache::NamespacedCache;
pub use codec::{JsonSerializer, SerializationError, Serializer, StringSerializer};
pub use config::{
    CacheSettings, DEFAULT_CACHE_KEY_PREFIX, DEFAULT_EXPIRE_SECS, DEFAULT_MEMO_MAX_ENTRIES,
    DEFAULT_SESSION_IN_MEMORY_TIMEOUT, DEFAULT_SESSION_KEY_PREFIX, RETAIN_EXPIRE, SessionSettings,
};
pub use error::{CacheError, Result, SessionError, SessionResult};
pub use key::{CacheKey, IdentityKey};
pub use registry::CacheRegistry;
pub use session::{
    PersistentSession, ReadMemo, Session, SessionIdGenerator, SessionStore,
    UuidSessionIdGenerator,
};
#[cfg(feature = "redis")]
pub use store::RedisStore;
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
