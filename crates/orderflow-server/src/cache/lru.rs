//! Capacity-bounded LRU cache.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

use super::error::CacheError;
use super::recency_list::{NodeId, RecencyList};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    node: NodeId,
}

#[derive(Debug)]
struct LruState<K, V> {
    entries: HashMap<K, Entry<V>>,
    recency: RecencyList<K>,
}

/// Key/value store that evicts the least recently used key once more than
/// `capacity` keys are tracked.
///
/// Every operation runs under one mutex, reads included: a hit reorders the
/// recency list, so there is no read-only path.
///
/// # Examples
///
/// ```
/// use orderflow_server::cache::BoundedLruCache;
///
/// let cache = BoundedLruCache::new(2).unwrap();
/// cache.set("a", 1).unwrap();
/// cache.set("b", 2).unwrap();
/// cache.get(&"a").unwrap();
///
/// let evicted = cache.set("c", 3).unwrap();
/// assert_eq!(evicted, Some("b"));
/// ```
#[derive(Debug)]
pub struct BoundedLruCache<K, V> {
    state: Mutex<LruState<K, V>>,
    capacity: usize,
}

impl<K, V> BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    ///
    /// # Errors
    ///
    /// `CacheError::ZeroCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            state: Mutex::new(LruState {
                entries: HashMap::with_capacity(capacity + 1),
                recency: RecencyList::new(),
            }),
            capacity,
        })
    }

    /// Returns the value and marks the key as most recently used.
    ///
    /// A miss leaves the cache untouched.
    pub fn get(&self, key: &K) -> Result<Option<V>, CacheError> {
        let state = self.state.lock();
        let Some(entry) = state.entries.get(key) else {
            return Ok(None);
        };

        state
            .recency
            .move_node_to_front(entry.node)
            .map_err(|e| CacheError::Corrupted(format!("entry without list node: {e}")))?;
        Ok(Some(entry.value.clone()))
    }

    /// Inserts or overwrites a value at the front.
    ///
    /// Returns the evicted key when the insertion pushed the cache over
    /// capacity. Overwriting a present key never evicts.
    pub fn set(&self, key: K, value: V) -> Result<Option<K>, CacheError> {
        let mut state = self.state.lock();
        let LruState { entries, recency } = &mut *state;

        if let Some(entry) = entries.get_mut(&key) {
            entry.value = value;
            recency
                .move_node_to_front(entry.node)
                .map_err(|e| CacheError::Corrupted(format!("entry without list node: {e}")))?;
            return Ok(None);
        }

        let node = recency.push_front(key.clone());
        entries.insert(key, Entry { value, node });

        if entries.len() <= self.capacity {
            return Ok(None);
        }

        let evicted = recency.remove_last()?;
        if entries.remove(&evicted).is_none() {
            return Err(CacheError::Corrupted(
                "evicted list key has no entry".to_string(),
            ));
        }
        Ok(Some(evicted))
    }

    /// Returns the value without touching recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Removes a key, returning its value.
    pub fn remove(&self, key: &K) -> Result<Option<V>, CacheError> {
        let mut state = self.state.lock();
        let Some(entry) = state.entries.remove(key) else {
            return Ok(None);
        };
        state
            .recency
            .remove_node(entry.node)
            .map_err(|e| CacheError::Corrupted(format!("entry without list node: {e}")))?;
        Ok(Some(entry.value))
    }

    /// Number of keys currently tracked.
    pub fn keys_amount(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.state.lock().recency.to_vec()
    }
}
