//! Byte-level cache storage.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use thiserror::Error;

use super::key::CacheKey;

/// Failure of a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache value could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cached value could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Storage of serialized values with a per-entry TTL.
///
/// Writes are last-writer-wins; implementations must be safe to share
/// between workers.
pub trait CacheBackend: Send + Sync + Debug {
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>, CacheError>;

    fn set(&self, key: &CacheKey, value: Arc<[u8]>, ttl: Duration) -> Result<(), CacheError>;

    fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError>;

    /// Approximate number of live entries.
    fn entry_count(&self) -> u64;
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct EntryExpiry;

impl Expiry<CacheKey, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &CacheKey, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process backend on a bounded `moka` cache.
#[derive(Clone)]
pub struct MokaBackend {
    inner: Cache<CacheKey, Entry>,
}

impl MokaBackend {
    pub fn new(max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();
        Self { inner }
    }
}

impl Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl CacheBackend for MokaBackend {
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>, CacheError> {
        Ok(self.inner.get(key).map(|e| e.bytes))
    }

    fn set(&self, key: &CacheKey, value: Arc<[u8]>, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(key.clone(), Entry { bytes: value, ttl });
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.inner.invalidate(key);
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}
