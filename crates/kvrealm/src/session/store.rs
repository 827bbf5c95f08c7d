//! Session persistence over the key-value store.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::memo::ReadMemo;
use super::model::{PersistentSession, Session, SessionIdGenerator, UuidSessionIdGenerator};
use crate::codec::{JsonSerializer, Serializer, StringSerializer};
use crate::config::SessionSettings;
use crate::error::{SessionError, SessionResult};
use crate::store::KeyValueStore;

/// Persists sessions under `key_prefix + session_id` with a store-side TTL.
///
/// Record lifecycle: nonexistent → persisted (on `create`) → persisted
/// (on each `update`) → nonexistent (on `delete` or TTL expiry).
///
/// Reads go through a caller-owned [`ReadMemo`], so repeated reads of one
/// session within one unit of work cost a single store round trip.
pub struct SessionStore<S = Session> {
    store: Arc<dyn KeyValueStore>,
    settings: SessionSettings,
    key_serializer: Arc<dyn Serializer<String>>,
    value_serializer: Arc<dyn Serializer<S>>,
    id_generator: Arc<dyn SessionIdGenerator>,
}

impl<S> SessionStore<S>
where
    S: PersistentSession + Serialize + DeserializeOwned,
{
    /// Create a session store with the default codecs and UUID ids.
    pub fn new(store: Arc<dyn KeyValueStore>, settings: SessionSettings) -> Self {
        Self::with_serializers(
            store,
            settings,
            Arc::new(StringSerializer),
            Arc::new(JsonSerializer::<S>::new()),
        )
    }
}

impl<S: PersistentSession> SessionStore<S> {
    /// Create a session store with custom codecs.
    pub fn with_serializers(
        store: Arc<dyn KeyValueStore>,
        settings: SessionSettings,
        key_serializer: Arc<dyn Serializer<String>>,
        value_serializer: Arc<dyn Serializer<S>>,
    ) -> Self {
        Self {
            store,
            settings,
            key_serializer,
            value_serializer,
            id_generator: Arc::new(UuidSessionIdGenerator),
        }
    }

    /// Replace the id generator.
    pub fn with_id_generator(mut self, generator: Arc<dyn SessionIdGenerator>) -> Self {
        self.id_generator = generator;
        self
    }

    /// Get the store settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// A fresh read memo configured for this store.
    ///
    /// Create one per unit of work (request, task) and drop it with it.
    pub fn read_memo(&self) -> ReadMemo<S> {
        ReadMemo::new(
            self.settings.in_memory_timeout,
            self.settings.memo_max_entries,
        )
    }

    fn session_key(&self, session_id: &str) -> String {
        format!("{}{}", self.settings.key_prefix, session_id)
    }

    fn raw_key(&self, session_id: &str) -> SessionResult<Vec<u8>> {
        self.key_serializer
            .serialize(&self.session_key(session_id))
            .map_err(|source| SessionError::Serialization {
                session_id: session_id.to_string(),
                source,
            })
    }

    /// Assign a fresh id to `session`, persist it, and return the id.
    pub fn create(&self, session: Option<&mut S>) -> SessionResult<String> {
        let Some(session) = session else {
            error!("session is absent");
            return Err(SessionError::UnknownSession("session is absent".to_string()));
        };

        let session_id = self.id_generator.generate_id();
        session.assign_id(session_id.clone());
        self.update(Some(&*session))?;
        debug!(session_id = %session_id, "Session created");
        Ok(session_id)
    }

    /// Persist the full session with the store TTL.
    ///
    /// A store TTL shorter than the session's own timeout is allowed but
    /// logged as a warning: the store may drop the session while the host
    /// still considers it live.
    pub fn update(&self, session: Option<&S>) -> SessionResult<()> {
        let Some((session, session_id)) = session.and_then(|s| s.id().map(|id| (s, id))) else {
            error!("session or session id is absent");
            return Err(SessionError::UnknownSession(
                "session or session id is absent".to_string(),
            ));
        };

        let key = self.raw_key(session_id)?;
        let value = self.value_serializer.serialize(session).map_err(|source| {
            error!(session_id = %session_id, error = %source, "Failed to serialize session");
            SessionError::Serialization {
                session_id: session_id.to_string(),
                source,
            }
        })?;

        let ttl_millis = i64::try_from(self.settings.ttl_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        if self.settings.ttl_seconds > 0 && ttl_millis < session.timeout_millis() {
            warn!(
                session_id = %session_id,
                store_expire_millis = ttl_millis,
                session_timeout_millis = session.timeout_millis(),
                "Store expire time is shorter than the session timeout; sessions may vanish early"
            );
        }

        self.store
            .set(&key, Some(&value), self.settings.ttl_seconds)?;
        Ok(())
    }

    /// Remove the persisted record.
    ///
    /// An absent session or id is logged and ignored. Deleting a record
    /// that does not exist is not an error.
    pub fn delete(&self, session: Option<&S>) -> SessionResult<()> {
        let Some(session_id) = session.and_then(|s| s.id()) else {
            error!("session or session id is absent");
            return Ok(());
        };

        let key = match self.raw_key(session_id) {
            Ok(key) => key,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to delete session");
                return Ok(());
            }
        };
        self.store.del(&key)?;
        debug!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    /// Read a session, serving repeats from `memo`.
    ///
    /// A missing or expired record, or one that fails to decode, reads as
    /// `None`. Decode failures are logged.
    pub fn read(
        &self,
        memo: &mut ReadMemo<S>,
        session_id: Option<&str>,
    ) -> SessionResult<Option<S>> {
        let Some(session_id) = session_id else {
            warn!("session id is absent");
            return Ok(None);
        };

        if let Some(session) = memo.get(session_id) {
            return Ok(Some(session));
        }

        debug!(session_id = %session_id, "Reading session from store");
        let raw = self.store.get(&self.raw_key(session_id)?)?;
        match self.value_serializer.deserialize(raw.as_deref()) {
            Ok(Some(session)) => {
                memo.insert(session_id, session.clone());
                Ok(Some(session))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to read session");
                Ok(None)
            }
        }
    }

    /// Every session persisted under the session prefix.
    ///
    /// Unlike the cache scans, this stops at the first entry that fails to
    /// decode and returns the sessions decoded up to that point. Entries
    /// that expire between the scan and their fetch are skipped.
    pub fn active_sessions(&self) -> SessionResult<Vec<S>> {
        let mut sessions = Vec::new();

        let pattern = format!("{}*", self.settings.key_prefix);
        let pattern = match self.key_serializer.serialize(&pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                error!(error = %e, "Failed to list active sessions");
                return Ok(sessions);
            }
        };

        for key in self.store.keys(&pattern)? {
            let raw = self.store.get(&key)?;
            match self.value_serializer.deserialize(raw.as_deref()) {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {}
                Err(e) => {
                    error!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        decoded = sessions.len(),
                        "Failed to decode session, returning partial list"
                    );
                    break;
                }
            }
        }
        Ok(sessions)
    }
}

impl<S> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("settings", &self.settings)
            .finish()
    }
}
