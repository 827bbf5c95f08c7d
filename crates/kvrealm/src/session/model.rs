//! Session model and id generation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default session timeout: 30 minutes.
pub const DEFAULT_SESSION_TIMEOUT_MILLIS: i64 = 30 * 60 * 1000;

/// A session type the [`SessionStore`](super::SessionStore) can persist.
///
/// Hosts that own their session representation implement this for it;
/// [`Session`] is the stock implementation.
pub trait PersistentSession: Clone + Send + Sync + 'static {
    /// Identifier, once one has been assigned.
    fn id(&self) -> Option<&str>;

    /// Bind an identifier to this session.
    fn assign_id(&mut self, id: String);

    /// Host-side timeout in milliseconds. Negative means "never times out".
    fn timeout_millis(&self) -> i64;
}

/// A serializable session with host-defined attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier, assigned by the store on create.
    pub id: Option<String>,

    /// When the session was started.
    pub start_timestamp: DateTime<Utc>,

    /// When the session was last used.
    pub last_access_time: DateTime<Utc>,

    /// Host-side timeout in milliseconds.
    pub timeout_millis: i64,

    /// Host the session originated from, if known.
    pub host: Option<String>,

    /// Arbitrary attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Default for Session {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            start_timestamp: now,
            last_access_time: now,
            timeout_millis: DEFAULT_SESSION_TIMEOUT_MILLIS,
            host: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl Session {
    /// Create a session started now, without an id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout in milliseconds.
    pub fn with_timeout_millis(mut self, timeout_millis: i64) -> Self {
        self.timeout_millis = timeout_millis;
        self
    }

    /// Set the originating host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Get an attribute.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, key: &str) -> Option<serde_json::Value> {
        self.attributes.remove(key)
    }

    /// Record an access now.
    pub fn touch(&mut self) {
        self.last_access_time = Utc::now();
    }

    /// Whether the session had timed out at `now`.
    pub fn is_timed_out_at(&self, now: DateTime<Utc>) -> bool {
        if self.timeout_millis < 0 {
            return false;
        }
        (now - self.last_access_time).num_milliseconds() > self.timeout_millis
    }
}

impl PersistentSession for Session {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn timeout_millis(&self) -> i64 {
        self.timeout_millis
    }
}

/// Source of fresh session identifiers.
pub trait SessionIdGenerator: Send + Sync {
    /// Produce a new, unique identifier.
    fn generate_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSessionIdGenerator;

impl SessionIdGenerator for UuidSessionIdGenerator {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
