//! In-process caching of parsed descriptors

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::debug;

use crate::doc::DocumentHandle;
use crate::error::{Error, Result};
use crate::model::{Coordinate, Location};

/// Idle period after which an untouched entry is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Number of documents held before the least recently used one is dropped.
pub const DEFAULT_CAPACITY: usize = 512;

/// Cache key combining coordinate and source location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub coordinate: Coordinate,
    pub location: Location,
}

impl CacheKey {
    pub fn new(coordinate: Coordinate, location: Location) -> Self {
        Self {
            coordinate,
            location,
        }
    }
}

#[derive(Debug)]
struct Entry {
    handle: Arc<DocumentHandle>,
    last_access: Instant,
}

/// Process-wide cache of parsed descriptors.
///
/// Clones share the same storage. Entries expire after an idle period and
/// the least recently used entry is dropped once the capacity is exceeded,
/// so a miss is always possible and callers must be able to rebuild.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    entries: Arc<Mutex<HashMap<CacheKey, Entry>>>,
    idle_timeout: Duration,
    capacity: usize,
}

impl DocumentCache {
    /// Create a cache with the default idle timeout and capacity
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_IDLE_TIMEOUT, DEFAULT_CAPACITY)
    }

    pub fn with_settings(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
            capacity: capacity.max(1),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, Entry>>> {
        self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: "document cache".to_string(),
        })
    }

    /// Store a handle under its own key, returning the handle that is now
    /// cached for that key.
    pub fn intern(&self, handle: Arc<DocumentHandle>) -> Result<Arc<DocumentHandle>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        Self::drop_expired(&mut entries, self.idle_timeout, now);

        let key = handle.cache_key();
        debug!("Caching {}", handle);
        entries.insert(
            key,
            Entry {
                handle: Arc::clone(&handle),
                last_access: now,
            },
        );

        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting {} @ {}", key.coordinate, key.location);
                    entries.remove(&key);
                }
                None => break,
            }
        }

        Ok(handle)
    }

    /// Get a cached handle, refreshing its idle timer
    pub fn get(&self, key: &CacheKey) -> Result<Option<Arc<DocumentHandle>>> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        let expired = entries
            .get(key)
            .map(|entry| now.duration_since(entry.last_access) > self.idle_timeout)
            .unwrap_or(false);
        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get_mut(key).map(|entry| {
            entry.last_access = now;
            Arc::clone(&entry.handle)
        }))
    }

    /// The first location, in order, holding a cached copy of `coordinate`.
    pub fn first_cached(&self, coordinate: &Coordinate, locations: &[Location]) -> Result<Option<Arc<DocumentHandle>>> {
        for location in locations {
            let key = CacheKey::new(coordinate.clone(), location.clone());
            if let Some(handle) = self.get(&key)? {
                debug!("Cache hit for {}", handle);
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// Every cached copy of `coordinate` across `locations`, in location order.
    pub fn all_cached(&self, coordinate: &Coordinate, locations: &[Location]) -> Result<Vec<Arc<DocumentHandle>>> {
        let mut found = Vec::new();
        for location in locations {
            let key = CacheKey::new(coordinate.clone(), location.clone());
            if let Some(handle) = self.get(&key)? {
                found.push(handle);
            }
        }
        Ok(found)
    }

    /// Drop every entry that has been idle for longer than the timeout.
    pub fn evict_expired(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        Ok(Self::drop_expired(&mut entries, self.idle_timeout, Instant::now()))
    }

    fn drop_expired(entries: &mut HashMap<CacheKey, Entry>, idle_timeout: Duration, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_access) <= idle_timeout);
        before - entries.len()
    }

    /// Check if a key exists in cache
    pub fn contains(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// Clear all cached entries
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    /// Get the number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;
    use std::thread;

    fn handle(artifact: &str, location: &str) -> Arc<DocumentHandle> {
        Arc::new(DocumentHandle::new(
            Coordinate::new("org.test", artifact, "1"),
            Location::new(location).unwrap(),
            parse("inline", b"<project/>").unwrap(),
        ))
    }

    #[test]
    fn test_cache_key() {
        let location = Location::new("file:///repo/").unwrap();
        let key1 = CacheKey::new(Coordinate::new("g", "a", "1"), location.clone());
        let key2 = CacheKey::new(Coordinate::new("g", "a", "1"), location.clone());
        let key3 = CacheKey::new(Coordinate::new("g", "a", "2"), location);

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
    }

    #[test]
    fn test_cache_intern_and_get() {
        let cache = DocumentCache::new();
        assert!(cache.is_empty().unwrap());

        let original = handle("a", "file:///repo/");
        let key = original.cache_key();
        cache.intern(Arc::clone(&original)).unwrap();

        let cached = cache.get(&key).unwrap().unwrap();
        assert!(Arc::ptr_eq(&original, &cached));
        assert!(cache.contains(&key).unwrap());
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_cache_location_is_part_of_identity() {
        let cache = DocumentCache::new();
        cache.intern(handle("a", "file:///one/")).unwrap();

        let key = CacheKey::new(
            Coordinate::new("org.test", "a", "1"),
            Location::new("file:///two/").unwrap(),
        );
        assert!(cache.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_first_cached_respects_location_order() {
        let cache = DocumentCache::new();
        let second = handle("a", "file:///two/");
        let third = handle("a", "file:///three/");
        cache.intern(Arc::clone(&second)).unwrap();
        cache.intern(Arc::clone(&third)).unwrap();

        let locations = vec![
            Location::new("file:///one/").unwrap(),
            Location::new("file:///two/").unwrap(),
            Location::new("file:///three/").unwrap(),
        ];
        let coordinate = Coordinate::new("org.test", "a", "1");

        let found = cache.first_cached(&coordinate, &locations).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(cache.all_cached(&coordinate, &locations).unwrap().len(), 2);
    }

    #[test]
    fn test_cache_idle_expiry() {
        let cache = DocumentCache::with_settings(Duration::from_millis(20), 16);
        let original = handle("a", "file:///repo/");
        let key = original.cache_key();
        cache.intern(original).unwrap();

        thread::sleep(Duration::from_millis(60));
        assert!(cache.get(&key).unwrap().is_none());
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_cache_evict_expired() {
        let cache = DocumentCache::with_settings(Duration::from_millis(20), 16);
        cache.intern(handle("a", "file:///repo/")).unwrap();
        cache.intern(handle("b", "file:///repo/")).unwrap();

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.evict_expired().unwrap(), 2);
    }

    #[test]
    fn test_cache_capacity_drops_least_recently_used() {
        let cache = DocumentCache::with_settings(DEFAULT_IDLE_TIMEOUT, 2);
        let a = handle("a", "file:///repo/");
        let b = handle("b", "file:///repo/");
        let c = handle("c", "file:///repo/");

        cache.intern(Arc::clone(&a)).unwrap();
        thread::sleep(Duration::from_millis(5));
        cache.intern(Arc::clone(&b)).unwrap();
        thread::sleep(Duration::from_millis(5));
        // touch a so b becomes the oldest
        cache.get(&a.cache_key()).unwrap();
        thread::sleep(Duration::from_millis(5));
        cache.intern(Arc::clone(&c)).unwrap();

        assert_eq!(cache.len().unwrap(), 2);
        assert!(cache.contains(&a.cache_key()).unwrap());
        assert!(!cache.contains(&b.cache_key()).unwrap());
        assert!(cache.contains(&c.cache_key()).unwrap());
    }

    #[test]
    fn test_cache_clones_share_storage() {
        let cache = DocumentCache::new();
        let clone = cache.clone();
        cache.intern(handle("a", "file:///repo/")).unwrap();
        assert_eq!(clone.len().unwrap(), 1);

        clone.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_cache_concurrent_access() {
        let cache = DocumentCache::new();
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let handle = handle(&format!("a{}", i), "file:///repo/");
                    let key = handle.cache_key();
                    cache.intern(handle).unwrap();
                    cache.get(&key).unwrap().is_some()
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().unwrap());
        }
        assert_eq!(cache.len().unwrap(), 8);
    }
}
