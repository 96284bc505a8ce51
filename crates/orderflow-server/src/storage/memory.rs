//! Process-local order store.

use std::collections::HashMap;

use async_trait::async_trait;
use orderflow_core::{Order, OrderError, OrderStorage};
use parking_lot::RwLock;
use tracing::debug;

/// [`OrderStorage`] kept in a map.
///
/// Saving an existing `order_uid` replaces it, so a redelivered message
/// is harmless.
#[derive(Debug, Default)]
pub struct InMemoryOrderStorage {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `orders`.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.order_uid.clone(), order))
            .collect();
        Self {
            orders: RwLock::new(orders),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderStorage for InMemoryOrderStorage {
    async fn get_order_by_id(&self, order_uid: &str) -> Result<Order, OrderError> {
        self.orders
            .read()
            .get(order_uid)
            .cloned()
            .ok_or_else(|| OrderError::not_found(order_uid))
    }

    async fn get_last_orders(&self, limit: usize) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read();
        let mut latest: Vec<&Order> = orders.values().collect();
        latest.sort_by(|a, b| {
            b.date_created
                .cmp(&a.date_created)
                .then_with(|| a.order_uid.cmp(&b.order_uid))
        });
        Ok(latest.into_iter().take(limit).cloned().collect())
    }

    async fn save_order(&self, order: &Order) -> Result<(), OrderError> {
        let replaced = self
            .orders
            .write()
            .insert(order.order_uid.clone(), order.clone());
        debug!(
            order_uid = %order.order_uid,
            replaced = replaced.is_some(),
            "Order saved"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
