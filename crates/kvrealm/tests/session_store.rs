//! Integration tests for session persistence and the read memo.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{CountingStore, DownStore, SequentialIds, capture_logs};
use kvrealm::{
    CacheKey, CacheRegistry, CacheSettings, KeyValueStore, Session, SessionError, SessionSettings,
    SessionStore,
};
use tracing::Level;

fn session_store(store: Arc<CountingStore>, settings: SessionSettings) -> SessionStore {
    SessionStore::new(store, settings).with_id_generator(Arc::new(SequentialIds::default()))
}

#[test]
fn memo_collapses_reads_within_timeout() {
    let store = CountingStore::new();
    let sessions = session_store(
        store.clone(),
        SessionSettings::new().with_in_memory_timeout(Duration::from_millis(100)),
    );
    let id = sessions.create(Some(&mut Session::new())).unwrap();
    let mut memo = sessions.read_memo();

    assert!(sessions.read(&mut memo, Some(&id)).unwrap().is_some());
    assert!(sessions.read(&mut memo, Some(&id)).unwrap().is_some());
    assert_eq!(store.gets(), 1);

    std::thread::sleep(Duration::from_millis(150));

    assert!(sessions.read(&mut memo, Some(&id)).unwrap().is_some());
    assert_eq!(store.gets(), 2);
}

#[test]
fn memos_are_independent_per_unit_of_work() {
    let store = CountingStore::new();
    let sessions = Arc::new(session_store(store.clone(), SessionSettings::default()));
    let id = sessions.create(Some(&mut Session::new())).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sessions = Arc::clone(&sessions);
            let id = id.clone();
            std::thread::spawn(move || {
                let mut memo = sessions.read_memo();
                for _ in 0..5 {
                    assert!(sessions.read(&mut memo, Some(&id)).unwrap().is_some());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One store fetch per worker, not per read.
    assert_eq!(store.gets(), 4);
}

#[test]
fn short_store_ttl_warns_but_persists() {
    let store = CountingStore::new();
    let sessions = session_store(store.clone(), SessionSettings::new().with_ttl_seconds(1));
    let mut session = Session::new().with_timeout_millis(2000);

    let (result, logs) = capture_logs(|| sessions.create(Some(&mut session)));

    let id = result.unwrap();
    assert_eq!(logs.count(Level::WARN), 1);
    assert_eq!(logs.count(Level::ERROR), 0);
    assert!(store.inner.contains(format!("shiro:session:{id}").as_bytes()));
}

#[test]
fn long_store_ttl_does_not_warn() {
    let store = CountingStore::new();
    let sessions = session_store(store, SessionSettings::default());
    let mut session = Session::new().with_timeout_millis(2000);

    let (result, logs) = capture_logs(|| sessions.create(Some(&mut session)));

    assert!(result.is_ok());
    assert_eq!(logs.count(Level::WARN), 0);
}

#[test]
fn session_lifecycle() {
    let store = CountingStore::new();
    let sessions = session_store(store.clone(), SessionSettings::default());
    let mut session = Session::new();

    let id = sessions.create(Some(&mut session)).unwrap();
    assert_eq!(id, "s1");

    session.set_attribute("user", "alice");
    sessions.update(Some(&session)).unwrap();

    // A fresh memo sees the update.
    let mut memo = sessions.read_memo();
    let read = sessions.read(&mut memo, Some(&id)).unwrap().unwrap();
    assert_eq!(read.attribute("user"), Some(&serde_json::json!("alice")));

    sessions.delete(Some(&session)).unwrap();
    let mut memo = sessions.read_memo();
    assert_eq!(sessions.read(&mut memo, Some(&id)).unwrap(), None);
}

#[test]
fn delete_without_id_is_logged_not_failed() {
    let store = CountingStore::new();
    let sessions = session_store(store.clone(), SessionSettings::default());

    let (result, logs) = capture_logs(|| sessions.delete(Some(&Session::new())));

    assert!(result.is_ok());
    assert_eq!(logs.count(Level::ERROR), 1);
    assert_eq!(store.dels(), 0);
}

#[test]
fn active_sessions_stop_at_first_corrupt_entry() {
    let store = CountingStore::new();
    let sessions = session_store(store.clone(), SessionSettings::default());
    for _ in 0..2 {
        sessions.create(Some(&mut Session::new())).unwrap(); // s1, s2
    }
    store
        .set(b"shiro:session:s3", Some(b"not a session"), 0)
        .unwrap();
    let mut last = Session::new();
    last.id = Some("s4".to_string());
    sessions.update(Some(&last)).unwrap();

    // Scan order is s1, s2, s3, s4: decoding halts at s3.
    let active = sessions.active_sessions().unwrap();
    let ids: Vec<_> = active.iter().filter_map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
}

#[test]
fn cache_values_skip_corrupt_entries_unlike_active_sessions() {
    let store = CountingStore::new();
    let registry = CacheRegistry::<String>::new(store.clone(), CacheSettings::default());
    let cache = registry.get_cache("auth");
    cache.put(Some(&CacheKey::from("a")), Some("1".into())).unwrap();
    store
        .set(b"shiro:cache:auth:b", Some(b"not json"), 0)
        .unwrap();
    cache.put(Some(&CacheKey::from("c")), Some("3".into())).unwrap();

    // Same layout as above, but the cache scan tolerates the bad entry.
    assert_eq!(cache.values(), vec!["1".to_string(), "3".to_string()]);
}

#[test]
fn write_failures_surface_as_session_errors() {
    let sessions = SessionStore::<Session>::new(Arc::new(DownStore), SessionSettings::default());

    let err = sessions.create(Some(&mut Session::new())).unwrap_err();
    assert!(matches!(err, SessionError::Store(_)));
    assert!(err.is_unknown_session());
    assert!(err.is_store_unavailable());

    let mut session = Session::new();
    session.id = Some("s1".to_string());
    let err = sessions.update(Some(&session)).unwrap_err();
    assert!(err.is_unknown_session());
    assert!(err.is_store_unavailable());

    let err = sessions.update(Some(&Session::new())).unwrap_err();
    assert!(err.is_unknown_session());
    assert!(!err.is_store_unavailable());
}
