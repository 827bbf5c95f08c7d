//! Redis store backend.
//!
//! Uses the blocking client with one lazily opened connection. A command
//! that fails at the I/O level drops the connection so the next call
//! reconnects.

use parking_lot::Mutex;
use redis::{Client, Connection, RedisError};
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError, StoreResult};

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_timeout() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

/// Key-value store backed by a Redis server.
pub struct RedisStore {
    client: Client,
    conn: Mutex<Option<Connection>>,
}

impl RedisStore {
    /// Create a store for the given connection URL (e.g., `redis://127.0.0.1:6379`).
    ///
    /// No connection is made until the first command.
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
        })
    }

    fn run<T>(&self, command: &redis::Cmd) -> StoreResult<T>
    where
        T: redis::FromRedisValue,
    {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            debug!("Opening Redis connection");
            *guard = Some(self.client.get_connection()?);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(StoreError::Unavailable("no Redis connection".to_string()));
        };

        match command.query(conn) {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.is_io_error() || err.is_connection_dropped() {
                    warn!(error = %err, "Redis connection lost, will reconnect");
                    *guard = None;
                }
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connected", &self.conn.lock().is_some())
            .finish()
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.run(redis::cmd("GET").arg(key))
    }

    fn set(&self, key: &[u8], value: Option<&[u8]>, ttl_seconds: u64) -> StoreResult<()> {
        let value = value.unwrap_or_default();
        if ttl_seconds > 0 {
            self.run(redis::cmd("SETEX").arg(key).arg(ttl_seconds).arg(value))
        } else {
            self.run(redis::cmd("SET").arg(key).arg(value))
        }
    }

    fn del(&self, key: &[u8]) -> StoreResult<()> {
        let _removed: i64 = self.run(redis::cmd("DEL").arg(key))?;
        Ok(())
    }

    fn keys(&self, pattern: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        self.run(redis::cmd("KEYS").arg(pattern))
    }

    fn db_size(&self) -> StoreResult<u64> {
        self.run(&redis::cmd("DBSIZE"))
    }
}
