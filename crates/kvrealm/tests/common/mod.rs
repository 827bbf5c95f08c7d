//! Shared test doubles for kvrealm integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kvrealm::{KeyValueStore, MemoryStore, SessionIdGenerator, StoreError, StoreResult};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Store wrapper that counts calls and returns scan results sorted.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    dels: AtomicUsize,
    scans: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn dels(&self) -> usize {
        self.dels.load(Ordering::SeqCst)
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: Option<&[u8]>, ttl_seconds: u64) -> StoreResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl_seconds)
    }

    fn del(&self, key: &[u8]) -> StoreResult<()> {
        self.dels.fetch_add(1, Ordering::SeqCst);
        self.inner.del(key)
    }

    fn keys(&self, pattern: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let mut keys = self.inner.keys(pattern)?;
        keys.sort();
        Ok(keys)
    }

    fn db_size(&self) -> StoreResult<u64> {
        self.inner.db_size()
    }
}

/// Store that is never reachable.
#[derive(Debug, Default)]
pub struct DownStore;

impl DownStore {
    fn down<T>() -> StoreResult<T> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

impl KeyValueStore for DownStore {
    fn get(&self, _key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Self::down()
    }

    fn set(&self, _key: &[u8], _value: Option<&[u8]>, _ttl_seconds: u64) -> StoreResult<()> {
        Self::down()
    }

    fn del(&self, _key: &[u8]) -> StoreResult<()> {
        Self::down()
    }

    fn keys(&self, _pattern: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        Self::down()
    }

    fn db_size(&self) -> StoreResult<u64> {
        Self::down()
    }
}

/// Hands out `s1`, `s2`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl SessionIdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        format!("s{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Captured `(level, message)` pairs.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub fn count(&self, level: Level) -> usize {
        self.events.lock().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

/// Tracing layer that records every event into [`CapturedLogs`].
pub struct CaptureLayer {
    logs: CapturedLogs,
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        self.logs
            .events
            .lock()
            .push((*event.metadata().level(), visitor.message));
    }
}

/// Run `f` with every tracing event captured.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    use tracing_subscriber::layer::SubscriberExt;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer { logs: logs.clone() });
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
