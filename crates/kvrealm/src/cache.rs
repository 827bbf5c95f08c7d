//! A single cache namespace over the key-value store.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::codec::Serializer;
use crate::error::Result;
use crate::key::CacheKey;
use crate::store::KeyValueStore;

/// A logical cache scoped under a key prefix.
///
/// Entries live in the shared store under `key_prefix + key` and expire
/// store-side after the cache TTL. The cache itself holds no entries, so it
/// is cheap to share across threads behind an `Arc`.
///
/// Namespace-wide operations (`clear`, `keys`, `values`) are plain scans:
/// writers running concurrently may or may not be observed, and keys they
/// insert during a `clear` can survive it.
pub struct NamespacedCache<V> {
    name: String,
    key_prefix: String,
    ttl_seconds: u64,
    store: Arc<dyn KeyValueStore>,
    key_serializer: Arc<dyn Serializer<String>>,
    value_serializer: Arc<dyn Serializer<V>>,
}

impl<V> NamespacedCache<V> {
    /// Create a cache. Every store key it writes starts with `key_prefix`.
    pub fn new(
        name: impl Into<String>,
        key_prefix: impl Into<String>,
        ttl_seconds: u64,
        store: Arc<dyn KeyValueStore>,
        key_serializer: Arc<dyn Serializer<String>>,
        value_serializer: Arc<dyn Serializer<V>>,
    ) -> Self {
        Self {
            name: name.into(),
            key_prefix: key_prefix.into(),
            ttl_seconds,
            store,
            key_serializer,
            value_serializer,
        }
    }

    /// Logical cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix of every store key in this namespace.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// TTL applied to every write, in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    fn raw_key(&self, key: &CacheKey) -> Result<Vec<u8>> {
        Ok(self.key_serializer.serialize(&key.store_key(&self.key_prefix))?)
    }

    fn scan_pattern(&self) -> String {
        format!("{}*", self.key_prefix)
    }

    /// Scan the namespace. Failures are logged and yield `None`.
    fn scan(&self, op: &'static str) -> Option<Vec<Vec<u8>>> {
        let pattern = match self.key_serializer.serialize(&self.scan_pattern()) {
            Ok(pattern) => pattern,
            Err(e) => {
                error!(cache = %self.name, op, error = %e, "Failed to encode scan pattern");
                return None;
            }
        };
        match self.store.keys(&pattern) {
            Ok(keys) => Some(keys),
            Err(e) => {
                error!(cache = %self.name, op, error = %e, "Namespace scan failed");
                None
            }
        }
    }

    /// Look up a value.
    ///
    /// An absent key returns `Ok(None)` without touching the store. A
    /// payload that fails to decode is an error, not a miss.
    pub fn get(&self, key: Option<&CacheKey>) -> Result<Option<V>> {
        let Some(key) = key else {
            return Ok(None);
        };
        debug!(cache = %self.name, key = %key, "get");

        let raw = self.store.get(&self.raw_key(key)?)?;
        Ok(self.value_serializer.deserialize(raw.as_deref())?)
    }

    /// Store a value with the cache TTL and hand it back.
    ///
    /// An absent key makes this a no-op. An absent value is still written,
    /// as an empty payload, rather than skipped or turned into a delete.
    pub fn put(&self, key: Option<&CacheKey>, value: Option<V>) -> Result<Option<V>> {
        let Some(key) = key else {
            warn!(
                cache = %self.name,
                "Caching under an absent key is meaningless, skipping store write"
            );
            return Ok(value);
        };
        debug!(cache = %self.name, key = %key, "put");

        let raw_key = self.raw_key(key)?;
        let payload = value
            .as_ref()
            .map(|v| self.value_serializer.serialize(v))
            .transpose()?;
        self.store.set(&raw_key, payload.as_deref(), self.ttl_seconds)?;
        Ok(value)
    }

    /// Remove a value and return what was stored, if anything.
    pub fn remove(&self, key: Option<&CacheKey>) -> Result<Option<V>> {
        let Some(key) = key else {
            return Ok(None);
        };
        debug!(cache = %self.name, key = %key, "remove");

        let raw_key = self.raw_key(key)?;
        let raw = self.store.get(&raw_key)?;
        let previous = self.value_serializer.deserialize(raw.as_deref())?;
        self.store.del(&raw_key)?;
        Ok(previous)
    }

    /// Delete every entry in this namespace, one key at a time.
    ///
    /// A failed scan is logged and ends the clear with nothing deleted. A
    /// failed delete is logged and the clear moves on to the next key.
    pub fn clear(&self) {
        debug!(cache = %self.name, "clear");
        let Some(keys) = self.scan("clear") else {
            return;
        };

        for key in keys {
            if let Err(e) = self.store.del(&key) {
                error!(
                    cache = %self.name,
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "Failed to delete key during clear"
                );
            }
        }
    }

    /// Number of keys in the **whole store**, not just this namespace.
    ///
    /// Callers needing a namespace count should use `keys().len()`.
    pub fn size(&self) -> Result<u64> {
        Ok(self.store.db_size()?)
    }

    /// Decoded store keys of every entry in this namespace.
    ///
    /// Keys that fail to decode are logged and skipped.
    pub fn keys(&self) -> HashSet<String> {
        let Some(raw_keys) = self.scan("keys") else {
            return HashSet::new();
        };

        let mut keys = HashSet::with_capacity(raw_keys.len());
        for raw in raw_keys {
            match self.key_serializer.deserialize(Some(&raw)) {
                Ok(Some(key)) => {
                    keys.insert(key);
                }
                Ok(None) => {}
                Err(e) => error!(cache = %self.name, error = %e, "Failed to decode key"),
            }
        }
        keys
    }

    /// Decoded values of every entry in this namespace.
    ///
    /// Entries that vanished since the scan, hold an absent payload, or fail
    /// to decode are left out.
    pub fn values(&self) -> Vec<V> {
        let Some(raw_keys) = self.scan("values") else {
            return Vec::new();
        };

        let mut values = Vec::with_capacity(raw_keys.len());
        for raw_key in raw_keys {
            let raw = match self.store.get(&raw_key) {
                Ok(raw) => raw,
                Err(e) => {
                    error!(cache = %self.name, error = %e, "Failed to fetch value");
                    continue;
                }
            };
            match self.value_serializer.deserialize(raw.as_deref()) {
                Ok(Some(value)) => values.push(value),
                Ok(None) => trace!(cache = %self.name, "Skipping absent value"),
                Err(e) => error!(cache = %self.name, error = %e, "Failed to decode value"),
            }
        }
        values
    }
}

impl<V> std::fmt::Debug for NamespacedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
