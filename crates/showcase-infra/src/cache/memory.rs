use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Cache, CacheError, CacheResult};

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Bounded in-process cache; least recently used entries are evicted first
/// and expired entries are dropped on read.
pub struct InMemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, LruCache<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }

    /// Whether a live entry exists for `key`, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock()
            .map(|entries| entries.peek(key).is_some_and(|e| !e.is_expired()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock()?.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.lock()?.pop(key);
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
