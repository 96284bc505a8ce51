//! Order cache usando Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::notification::RemovalCause;
use orderflow_core::{Order, OrderCache, OrderError};

use super::error::CacheError;
use crate::metrics::CacheMetrics;

/// Configuracion del cache Moka.
#[derive(Debug, Clone)]
pub struct MokaCacheConfig {
    /// Maximo numero de orders.
    pub max_capacity: u64,
    /// Time-to-idle opcional.
    pub time_to_idle: Option<Duration>,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_idle: None,
        }
    }
}

/// Alternativa a [`LruOrderCache`](super::LruOrderCache) basada en Moka.
///
/// Moka aplica TinyLFU en lugar de LRU estricto y procesa las evictions de
/// forma diferida, por lo que `keys_amount` es aproximado.
#[derive(Clone)]
pub struct MokaOrderCache {
    inner: Cache<String, Arc<Order>>,
    metrics: CacheMetrics,
}

impl MokaOrderCache {
    pub fn new(config: MokaCacheConfig) -> Result<Self, CacheError> {
        if config.max_capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }

        let metrics = CacheMetrics::new("moka");

        let mut builder = Cache::builder().max_capacity(config.max_capacity);
        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        let eviction_metrics = metrics.clone();
        builder = builder.eviction_listener(move |_key, _value, cause| {
            let reason = match cause {
                RemovalCause::Expired => "idle",
                RemovalCause::Size => "capacity",
                RemovalCause::Explicit => "manual",
                RemovalCause::Replaced => return,
            };
            eviction_metrics.record_eviction(reason);
        });

        Ok(Self {
            inner: builder.build(),
            metrics,
        })
    }

    /// Crea un cache con capacidad dada y sin expiracion.
    pub fn with_capacity(max_capacity: u64) -> Result<Self, CacheError> {
        Self::new(MokaCacheConfig {
            max_capacity,
            ..MokaCacheConfig::default()
        })
    }

    /// Invalida una order.
    pub async fn invalidate(&self, order_uid: &str) {
        self.inner.invalidate(order_uid).await;
    }

    /// Ejecuta las tareas pendientes de mantenimiento (evictions, contadores).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

impl std::fmt::Debug for MokaOrderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaOrderCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[async_trait]
impl OrderCache for MokaOrderCache {
    async fn get(&self, order_uid: &str) -> Result<Option<Arc<Order>>, OrderError> {
        let start = Instant::now();
        let result = self.inner.get(order_uid).await;

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
        self.inner.insert(order.order_uid.clone(), order).await;
        self.metrics
            .record_operation_duration("set", start.elapsed());
        self.metrics
            .update_entry_count(self.inner.entry_count() as usize);
        Ok(())
    }

    fn keys_amount(&self) -> usize {
        self.inner.entry_count() as usize
    }

    fn name(&self) -> &str {
        "moka"
    }
}
