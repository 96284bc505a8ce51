//! Order cache backed by [`BoundedLruCache`].

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use orderflow_core::{Order, OrderCache, OrderError};
use tracing::debug;

use super::error::CacheError;
use super::lru::BoundedLruCache;
use crate::metrics::CacheMetrics;

/// [`OrderCache`] with strict LRU eviction at a fixed capacity.
#[derive(Debug)]
pub struct LruOrderCache {
    inner: BoundedLruCache<String, Arc<Order>>,
    metrics: CacheMetrics,
}

impl LruOrderCache {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        Ok(Self {
            inner: BoundedLruCache::new(capacity)?,
            metrics: CacheMetrics::new("lru"),
        })
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    pub fn contains(&self, order_uid: &str) -> bool {
        self.inner.contains(&order_uid.to_string())
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[async_trait]
impl OrderCache for LruOrderCache {
    async fn get(&self, order_uid: &str) -> Result<Option<Arc<Order>>, OrderError> {
        let start = Instant::now();
        let result = self
            .inner
            .get(&order_uid.to_string())
            .map_err(|e| OrderError::cache(e.to_string()))?;

        if result.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        self.metrics
            .record_operation_duration("get", start.elapsed());

        Ok(result)
    }

    async fn set(&self, order: Arc<Order>) -> Result<(), OrderError> {
        let start = Instant::now();
        let key = order.order_uid.clone();
        let evicted = self
            .inner
            .set(key, order)
            .map_err(|e| OrderError::cache(e.to_string()))?;

        if let Some(evicted) = evicted {
            debug!(order_uid = %evicted, "Evicted least recently used order");
            self.metrics.record_eviction("capacity");
        }
        self.metrics
            .record_operation_duration("set", start.elapsed());
        self.metrics.update_entry_count(self.inner.keys_amount());

        Ok(())
    }

    fn keys_amount(&self) -> usize {
        self.inner.keys_amount()
    }

    fn name(&self) -> &str {
        "lru"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_order;

    fn order(uid: &str) -> Arc<Order> {
        Arc::new(sample_order(uid))
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = LruOrderCache::new(4).unwrap();
        cache.set(order("a")).await.unwrap();

        let cached = cache.get("a").await.unwrap().unwrap();
        assert_eq!(cached.order_uid, "a");
        assert_eq!(cache.metrics().hits(), 1);
        assert_eq!(cache.name(), "lru");
    }

    #[tokio::test]
    async fn test_miss_is_counted() {
        let cache = LruOrderCache::new(4).unwrap();

        assert!(cache.get("missing").await.unwrap().is_none());
        assert_eq!(cache.metrics().misses(), 1);
        assert_eq!(cache.keys_amount(), 0);
    }

    #[tokio::test]
    async fn test_eviction_is_recorded() {
        let cache = LruOrderCache::new(2).unwrap();
        cache.set(order("a")).await.unwrap();
        cache.set(order("b")).await.unwrap();
        cache.get("a").await.unwrap();
        cache.set(order("c")).await.unwrap();

        assert_eq!(cache.keys(), vec!["c", "a"]);
        assert!(!cache.contains("b"));
        assert_eq!(cache.metrics().evictions(), 1);
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            LruOrderCache::new(0),
            Err(CacheError::ZeroCapacity)
        ));
    }
}
