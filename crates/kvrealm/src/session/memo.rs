//! Short-lived memo of session reads.
//!
//! A single logical request (a login, say) reads the same session many times
//! in a row. A [`ReadMemo`] owned by that unit of work serves the repeats
//! from memory for a brief window, so the store sees one round trip.

use std::cell::Cell;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::trace;

/// Memoized session snapshot.
#[derive(Debug, Clone)]
struct MemoEntry<S> {
    session: S,
    captured_at: Instant,
}

/// Per-unit-of-work memo of recently read sessions.
///
/// Entries are valid while `captured_at.elapsed() < timeout`. A stale entry
/// is dropped when its id is next looked up, or by [`sweep`](Self::sweep).
/// The memo is bounded: inserting into a full memo sweeps stale entries
/// first, then evicts the oldest capture. Lookups never reorder entries.
///
/// The memo can move between threads with the work it belongs to, but it is
/// never shared (`!Sync`).
pub struct ReadMemo<S> {
    entries: LruCache<String, MemoEntry<S>>,
    timeout: Duration,
    _unshared: PhantomData<Cell<()>>,
}

impl<S: Clone> ReadMemo<S> {
    /// Create an empty memo. A capacity of zero is raised to one.
    pub fn new(timeout: Duration, max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            timeout,
            _unshared: PhantomData,
        }
    }

    /// Snapshot for `session_id`, if one was captured within the timeout.
    pub fn get(&mut self, session_id: &str) -> Option<S> {
        let entry = self.entries.peek(session_id)?;
        if entry.captured_at.elapsed() < self.timeout {
            trace!(session_id = %session_id, "Session served from read memo");
            return Some(entry.session.clone());
        }

        self.entries.pop(session_id);
        None
    }

    /// Capture a snapshot of `session` now.
    pub fn insert(&mut self, session_id: impl Into<String>, session: S) {
        let session_id = session_id.into();
        if !self.entries.contains(&session_id) && self.entries.len() >= self.entries.cap().get() {
            self.sweep();
        }

        let entry = MemoEntry {
            session,
            captured_at: Instant::now(),
        };
        if let Some((evicted, _)) = self.entries.push(session_id.clone(), entry)
            && evicted != session_id
        {
            trace!(session_id = %evicted, "Read memo full, evicted oldest capture");
        }
    }

    /// Forget `session_id`.
    pub fn invalidate(&mut self, session_id: &str) {
        self.entries.pop(session_id);
    }

    /// Drop every stale entry and return how many were removed.
    pub fn sweep(&mut self) -> usize {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.captured_at.elapsed() >= self.timeout)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.entries.pop(id);
        }
        stale.len()
    }

    /// Number of entries held, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the memo holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// How long an entry stays valid.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<S> std::fmt::Debug for ReadMemo<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadMemo")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("timeout", &self.timeout)
            .finish()
    }
}
