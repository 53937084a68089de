//! Response cache
//!
//! Values are stored as JSON text under a [`CacheKey`], the SHA-256 digest
//! of the JSON array `[prefix, operation, args]`. Entries expire after their
//! TTL as measured by the injected [`Clock`].

use super::clock::Clock;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Digest identifying one cached call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a prefix, an operation name and the call arguments
    pub fn new<A: Serialize + ?Sized>(prefix: &str, operation: &str, args: &A) -> Result<Self> {
        let payload = serde_json::to_string(&(prefix, operation, args))?;
        let digest = Sha256::digest(payload.as_bytes());
        Ok(Self(format!("{:x}", digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key/value store holding serialized responses
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> Result<()>;

    fn delete(&self, key: &CacheKey) -> Result<()>;

    /// Drop every entry
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache backend
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of entries held, including any that expired since the last write
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let lookup = entries
            .get(key)
            .map(|entry| (entry.expires_at > now, entry.value.clone()));

        match lookup {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> Result<()> {
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                Error::configuration(format!("Cache TTL of {}s is out of range", ttl.as_secs()))
            })?;

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < before {
            debug!("Purged {} expired cache entries", before - entries.len());
        }
        entries.insert(key.clone(), CacheEntry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &CacheKey) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// Return the cached value for `key`, or compute, store and return it
///
/// An entry that no longer decodes as `T` is treated as a miss.
pub fn cached<T, F>(backend: &dyn CacheBackend, key: &CacheKey, ttl: Duration, compute: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    if let Some(raw) = backend.get(key)? {
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Cache hit for key: {}", key);
                return Ok(value);
            }
            Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
        }
    }

    let value = compute()?;
    backend.set(key, serde_json::to_string(&value)?, ttl)?;
    debug!("Cached result for key: {}", key);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::middleware::clock::ManualClock;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn cache() -> (Arc<ManualClock>, MemoryCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let cache = MemoryCache::new(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_keys_are_deterministic_and_argument_sensitive() {
        let a = CacheKey::new("trips", "get_trips", &(Some(1), 100)).unwrap();
        let b = CacheKey::new("trips", "get_trips", &(Some(1), 100)).unwrap();
        let c = CacheKey::new("trips", "get_trips", &(Some(2), 100)).unwrap();
        let d = CacheKey::new("trips", "get_trip_stats", &(Some(1), 100)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_cached_computes_once_within_ttl() {
        let (_clock, cache) = cache();
        let key = CacheKey::new("trips", "count", &()).unwrap();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(42usize)
        };

        let ttl = Duration::from_secs(60);
        assert_eq!(cached(&cache, &key, ttl, compute).unwrap(), 42);
        assert_eq!(cached(&cache, &key, ttl, compute).unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_entries_expire_with_clock() {
        let (clock, cache) = cache();
        let key = CacheKey::new("trips", "count", &()).unwrap();
        cache.set(&key, "1".to_string(), Duration::from_secs(60)).unwrap();

        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(cache.get(&key).unwrap(), Some("1".to_string()));

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get(&key).unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_writes_purge_expired_entries() {
        let (clock, cache) = cache();
        for day in 0..50 {
            let key = CacheKey::new("trips", "get_trips", &(day,)).unwrap();
            cache.set(&key, "[]".to_string(), Duration::from_secs(60)).unwrap();
        }
        assert_eq!(cache.len(), 50);

        clock.advance(chrono::Duration::seconds(61));
        let fresh = CacheKey::new("trips", "get_trips", &(99,)).unwrap();
        cache.set(&fresh, "[]".to_string(), Duration::from_secs(60)).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&fresh).unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_unrepresentable_ttl_is_rejected() {
        let (_clock, cache) = cache();
        let key = CacheKey::new("trips", "count", &()).unwrap();

        let err = cache
            .set(&key, "1".to_string(), Duration::from_secs(9_000_000_000_000))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let err = cache
            .set(&key, "1".to_string(), Duration::from_secs(u64::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_undecodable_entry_is_recomputed() {
        let (_clock, cache) = cache();
        let key = CacheKey::new("trips", "count", &()).unwrap();
        cache
            .set(&key, "not json".to_string(), Duration::from_secs(60))
            .unwrap();

        let value: usize = cached(&cache, &key, Duration::from_secs(60), || Ok(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.get(&key).unwrap(), Some("7".to_string()));
    }

    #[test]
    fn test_compute_errors_are_not_cached() {
        let (_clock, cache) = cache();
        let key = CacheKey::new("trips", "count", &()).unwrap();

        let result: Result<usize> = cached(&cache, &key, Duration::from_secs(60), || {
            Err(Error::store("down"))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
