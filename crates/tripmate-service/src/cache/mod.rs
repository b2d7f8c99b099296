//! Result cache.
//!
//! Memoizes expensive results keyed by participant set and algorithm
//! configuration. The cache never fails a caller: backend errors and
//! undecodable values are logged and reported as misses, and failed writes
//! are dropped.

mod backend;
mod key;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use tripmate_config::CacheConfig;

pub use backend::{CacheBackend, CacheError, MokaBackend};
pub use key::CacheKey;

/// Hit, miss and error counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub errors: u64,
    pub entries: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

/// Typed facade over a [`CacheBackend`].
#[derive(Debug)]
pub struct ResultCache {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    counters: Counters,
}

impl ResultCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            enabled: true,
            counters: Counters::default(),
        }
    }

    /// Moka-backed cache sized by `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(Arc::new(MokaBackend::new(config.max_entries)));
        cache.enabled = config.enabled;
        cache
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        let mut cache = Self::new(Arc::new(MokaBackend::new(0)));
        cache.enabled = false;
        cache
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Looks up and decodes a value. Every failure is a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let bytes = match self.backend.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "cache miss");
                return None;
            }
            Err(e) => return self.failed_read(key, &e),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "cache hit");
                Some(value)
            }
            Err(e) => self.failed_read(key, &CacheError::Decode(e)),
        }
    }

    fn failed_read<T>(&self, key: &CacheKey, error: &CacheError) -> Option<T> {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        warn!(event = "cache_error", key = %key, error = %error, "cache read treated as miss");
        None
    }

    /// Encodes and stores a value. Failures are logged and dropped.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let result = serde_json::to_vec(value)
            .map_err(CacheError::Encode)
            .and_then(|bytes| self.backend.set(key, Arc::from(bytes), ttl));
        match result {
            Ok(()) => {
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, ttl_secs = ttl.as_secs(), "cache write");
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(event = "cache_error", key = %key, error = %e, "cache write dropped");
            }
        }
    }

    /// True if a decodable value of type `T` is cached under `key`.
    pub fn contains<T: DeserializeOwned>(&self, key: &CacheKey) -> bool {
        self.get::<T>(key).is_some()
    }

    pub fn invalidate(&self, key: &CacheKey) {
        if let Err(e) = self.backend.invalidate(key) {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
            warn!(event = "cache_error", key = %key, error = %e, "cache invalidation failed");
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            entries: self.backend.entry_count(),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
