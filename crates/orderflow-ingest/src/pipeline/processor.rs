use std::sync::Arc;

use async_trait::async_trait;
use orderflow_core::{Order, OrderError};

/// Dispatch target for valid orders.
///
/// An error makes the pipeline schedule the message for a retry.
#[async_trait]
pub trait OrderProcessor: Send + Sync {
    async fn process(&self, order: &Order) -> Result<(), OrderError>;
}

#[async_trait]
impl<P: OrderProcessor + ?Sized> OrderProcessor for Arc<P> {
    async fn process(&self, order: &Order) -> Result<(), OrderError> {
        (**self).process(order).await
    }
}
