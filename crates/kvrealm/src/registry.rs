//! Registry of named caches sharing one store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::NamespacedCache;
use crate::codec::{JsonSerializer, Serializer, StringSerializer};
use crate::config::CacheSettings;
use crate::store::KeyValueStore;

/// Creates and memoizes one [`NamespacedCache`] per cache name.
///
/// All caches share the store, the codecs and the TTL. The cache named
/// `name` stores its entries under `key_prefix + name + ":"`.
///
/// `get_cache` is an atomic get-or-create: concurrent first calls for the
/// same name all receive the same instance.
pub struct CacheRegistry<V> {
    caches: RwLock<HashMap<String, Arc<NamespacedCache<V>>>>,
    store: Arc<dyn KeyValueStore>,
    settings: CacheSettings,
    key_serializer: Arc<dyn Serializer<String>>,
    value_serializer: Arc<dyn Serializer<V>>,
}

impl<V> CacheRegistry<V>
where
    V: Serialize + DeserializeOwned + 'static,
{
    /// Create a registry with the default string key codec and JSON values.
    pub fn new(store: Arc<dyn KeyValueStore>, settings: CacheSettings) -> Self {
        Self::with_serializers(
            store,
            settings,
            Arc::new(StringSerializer),
            Arc::new(JsonSerializer::<V>::new()),
        )
    }
}

impl<V> CacheRegistry<V> {
    /// Create a registry with custom codecs.
    pub fn with_serializers(
        store: Arc<dyn KeyValueStore>,
        settings: CacheSettings,
        key_serializer: Arc<dyn Serializer<String>>,
        value_serializer: Arc<dyn Serializer<V>>,
    ) -> Self {
        Self {
            caches: RwLock::new(HashMap::new()),
            store,
            settings,
            key_serializer,
            value_serializer,
        }
    }

    /// Get the registry settings.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Global key prefix shared by every cache.
    pub fn key_prefix(&self) -> &str {
        &self.settings.key_prefix
    }

    /// TTL in seconds applied by every cache.
    pub fn ttl_seconds(&self) -> u64 {
        self.settings.ttl_seconds
    }

    /// Get the cache for `name`, creating it on first use.
    pub fn get_cache(&self, name: &str) -> Arc<NamespacedCache<V>> {
        if let Some(cache) = self.caches.read().get(name) {
            return Arc::clone(cache);
        }

        let mut caches = self.caches.write();
        let cache = caches.entry(name.to_string()).or_insert_with(|| {
            let key_prefix = format!("{}{}:", self.settings.key_prefix, name);
            debug!(cache = %name, key_prefix = %key_prefix, "Creating cache");
            Arc::new(NamespacedCache::new(
                name,
                key_prefix,
                self.settings.ttl_seconds,
                Arc::clone(&self.store),
                Arc::clone(&self.key_serializer),
                Arc::clone(&self.value_serializer),
            ))
        });
        Arc::clone(cache)
    }

    /// Names of the caches created so far, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of caches created so far.
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Whether no cache has been created yet.
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }
}

impl<V> std::fmt::Debug for CacheRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("settings", &self.settings)
            .field("caches", &self.cache_names())
            .finish()
    }
}
