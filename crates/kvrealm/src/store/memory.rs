//! In-process key-value store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::trace;

use super::{KeyValueStore, StoreResult, matches_pattern};

/// A stored payload with its expiry deadline.
#[derive(Debug, Clone)]
struct StoredEntry {
    value: Vec<u8>,
    /// `None` means the entry never expires.
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Thread-safe in-memory store with per-entry TTL.
///
/// Expired entries are dropped lazily: on read of that key, and by
/// [`purge_expired`](Self::purge_expired). Scans and counts skip them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, StoredEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `key` to expire now, as if its TTL had elapsed.
    ///
    /// Returns `false` if the key was not present.
    pub fn expire_now(&self, key: &[u8]) -> bool {
        match self.entries.write().get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now());
                true
            }
            None => false,
        }
    }

    /// Time left before `key` expires.
    ///
    /// `None` if the key is missing, expired, or has no TTL.
    pub fn remaining_ttl(&self, key: &[u8]) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.expires_at.map(|deadline| deadline - now)
    }

    /// Whether `key` holds a live entry.
    pub fn contains(&self, key: &[u8]) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Remove every entry.
    pub fn flush(&self) {
        self.entries.write().clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a writer may have replaced it.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            trace!(key = %String::from_utf8_lossy(key), "Dropped expired entry");
        }
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &[u8], value: Option<&[u8]>, ttl_seconds: u64) -> StoreResult<()> {
        // A deadline past what `Instant` can represent never arrives.
        let expires_at = if ttl_seconds > 0 {
            Instant::now().checked_add(Duration::from_secs(ttl_seconds))
        } else {
            None
        };
        let entry = StoredEntry {
            value: value.map(<[u8]>::to_vec).unwrap_or_default(),
            expires_at,
        };
        self.entries.write().insert(key.to_vec(), entry);
        Ok(())
    }

    fn del(&self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self, pattern: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && matches_pattern(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn db_size(&self) -> StoreResult<u64> {
        let now = Instant::now();
        let live = self
            .entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count();
        Ok(live as u64)
    }
}
