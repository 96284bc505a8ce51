//! Storage and cache ports.
//!
//! These traits abstract over the durable store and the cache backend so the
//! cache-aside service can be wired against any implementation.
//!
//! # Implementors
//!
//! - `InMemoryOrderStorage` (orderflow-server) - process-local store
//! - `LruOrderCache` (orderflow-server) - bounded LRU cache
//! - `MokaOrderCache` (orderflow-server) - moka-backed alternative cache

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Order;

/// A durable source of truth for orders.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Fetches a single order with all its sub-entities.
    ///
    /// # Errors
    ///
    /// - `OrderError::NotFound` if no order has the given id
    /// - `OrderError::Storage` if the store is not accessible
    async fn get_order_by_id(&self, order_uid: &str) -> Result<Order>;

    /// Returns up to `limit` orders, most recently created first.
    async fn get_last_orders(&self, limit: usize) -> Result<Vec<Order>>;

    /// Persists an order atomically across its sub-entities.
    async fn save_order(&self, order: &Order) -> Result<()>;

    /// Verifies that the store is reachable.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the name of this store, used for logging.
    fn name(&self) -> &str;
}

/// A key/value cache in front of [`OrderStorage`].
#[async_trait]
pub trait OrderCache: Send + Sync {
    /// Looks up an order. A hit counts as a use of the entry.
    async fn get(&self, order_uid: &str) -> Result<Option<Arc<Order>>>;

    /// Inserts or replaces an order.
    async fn set(&self, order: Arc<Order>) -> Result<()>;

    /// Number of keys currently tracked.
    fn keys_amount(&self) -> usize;

    /// Returns the name of this backend, used for logging.
    fn name(&self) -> &str;
}
