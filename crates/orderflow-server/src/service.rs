//! Cache-aside order service.
//!
//! Reads go to the cache first and fall back to storage; writes go to
//! storage first and only then to the cache. Cache population after a
//! storage read or write runs on a tracked background task, so a lookup
//! right after a save may still miss the cache until that task finishes.
//! [`OrderService::flush`] waits for all of them.

use std::sync::Arc;

use async_trait::async_trait;
use orderflow_core::{Order, OrderCache, OrderError, OrderStorage, Result};
use orderflow_ingest::OrderProcessor;
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Orchestrates the cache and the durable store.
pub struct OrderService {
    storage: Arc<dyn OrderStorage>,
    cache: Arc<dyn OrderCache>,
    fills: Mutex<JoinSet<()>>,
}

impl OrderService {
    pub fn new(storage: Arc<dyn OrderStorage>, cache: Arc<dyn OrderCache>) -> Self {
        Self {
            storage,
            cache,
            fills: Mutex::new(JoinSet::new()),
        }
    }

    /// Looks an order up, cache first.
    ///
    /// On a miss the order is read from storage and the cache is filled in
    /// the background.
    ///
    /// # Errors
    ///
    /// - `OrderError::Validation` for an empty id
    /// - `OrderError::NotFound` if storage has no such order
    /// - `OrderError::Cache` / `OrderError::Storage` from the backends
    pub async fn get_order(&self, order_uid: &str) -> Result<Arc<Order>> {
        if order_uid.is_empty() {
            return Err(OrderError::validation("order_uid", "is required"));
        }

        if let Some(order) = self.cache.get(order_uid).await? {
            debug!(order_uid, "Cache hit");
            return Ok(order);
        }

        debug!(order_uid, "Cache miss, reading storage");
        let order = Arc::new(self.storage.get_order_by_id(order_uid).await?);
        self.schedule_fill(Arc::clone(&order));
        Ok(order)
    }

    /// Persists an order, then caches it in the background.
    ///
    /// Nothing is cached if storage fails.
    pub async fn save_order(&self, order: Order) -> Result<()> {
        self.storage.save_order(&order).await?;
        info!(order_uid = %order.order_uid, "Order saved");
        self.schedule_fill(Arc::new(order));
        Ok(())
    }

    /// Returns up to `limit` orders, most recently created first.
    pub async fn get_last_orders(&self, limit: usize) -> Result<Vec<Order>> {
        self.storage.get_last_orders(limit).await
    }

    /// Loads the `limit` most recent orders into the cache concurrently.
    ///
    /// Stops at the first failed insertion and aborts the remaining ones.
    /// Returns how many orders were cached.
    pub async fn cache_last_orders(&self, limit: usize) -> Result<usize> {
        let orders = self.storage.get_last_orders(limit).await?;

        let mut inserts = JoinSet::new();
        for order in orders {
            let cache = Arc::clone(&self.cache);
            inserts.spawn(async move { cache.set(Arc::new(order)).await });
        }

        let mut cached = 0;
        while let Some(joined) = inserts.join_next().await {
            let outcome = joined.map_err(|e| OrderError::internal(e.to_string()));
            if let Err(e) = outcome.and_then(|inserted| inserted) {
                inserts.abort_all();
                error!(error = %e, cached, "Cache warmup failed");
                return Err(e);
            }
            cached += 1;
        }

        info!(cached, backend = self.cache.name(), "Cache warmed up");
        Ok(cached)
    }

    /// Waits for every scheduled cache fill, including ones scheduled while
    /// waiting.
    pub async fn flush(&self) {
        loop {
            let mut fills = std::mem::take(&mut *self.fills.lock());
            if fills.is_empty() {
                return;
            }
            while let Some(joined) = fills.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Cache fill task failed");
                }
            }
        }
    }

    /// Number of scheduled cache fills that have not finished.
    pub fn pending_fills(&self) -> usize {
        let mut fills = self.fills.lock();
        while fills.try_join_next().is_some() {}
        fills.len()
    }

    /// Verifies that storage is reachable.
    pub async fn health_check(&self) -> Result<()> {
        self.storage.health_check().await
    }

    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    pub fn cache_name(&self) -> &str {
        self.cache.name()
    }

    /// Number of orders currently cached.
    pub fn cached_orders(&self) -> usize {
        self.cache.keys_amount()
    }

    fn schedule_fill(&self, order: Arc<Order>) {
        let cache = Arc::clone(&self.cache);
        let mut fills = self.fills.lock();
        while fills.try_join_next().is_some() {}

        fills.spawn(async move {
            let order_uid = order.order_uid.clone();
            match cache.set(order).await {
                Ok(()) => debug!(%order_uid, "Order cached"),
                Err(e) => warn!(%order_uid, error = %e, "Failed to cache order"),
            }
        });
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("storage", &self.storage.name())
            .field("cache", &self.cache.name())
            .finish()
    }
}

#[async_trait]
impl OrderProcessor for OrderService {
    async fn process(&self, order: &Order) -> Result<()> {
        self.save_order(order.clone()).await
    }
}
