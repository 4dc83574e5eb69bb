//! Content cache
//!
//! Rendered page snapshots are cached under the fixed key namespace
//! (`home:v1`, `division:{slug}`, ...). The database stays the source of
//! truth: callers treat every [`CacheError`] as a miss or a no-op.

mod memory;

pub use memory::InMemoryCache;

use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value`, expiring after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Drop every entry.
    async fn flush(&self) -> CacheResult<()>;
}
