use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// A bounded LRU cache whose entries expire `ttl` after their last access.
pub struct SlidingCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> SlidingCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<K, (V, Instant)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries();
        let (value, last_access) = entries.get_mut(key)?;
        if now.duration_since(*last_access) >= self.ttl {
            entries.pop(key);
            return None;
        }
        *last_access = now;
        Some(value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries().put(key, (value, Instant::now()));
    }

    /// Inserts only when `keep` holds, checked while the cache is locked.
    pub fn insert_if(&self, key: K, value: V, keep: impl FnOnce() -> bool) -> bool {
        let mut entries = self.entries();
        if !keep() {
            return false;
        }
        entries.put(key, (value, Instant::now()));
        true
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries().pop(key).map(|(value, _)| value)
    }

    pub fn remove_where(&self, predicate: impl Fn(&K) -> bool)
    where
        K: Clone,
    {
        let mut entries = self.entries();
        let keys: Vec<K> = entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in keys {
            entries.pop(&key);
        }
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
