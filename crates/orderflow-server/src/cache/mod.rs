//! Cache module for the Orderflow server.
//!
//! Two [`OrderCache`](orderflow_core::OrderCache) backends:
//!
//! - [`LruOrderCache`]: strict LRU over [`BoundedLruCache`] and its
//!   arena-backed [`RecencyList`]
//! - [`MokaOrderCache`]: Moka, for deployments that prefer TinyLFU admission

pub mod error;
pub mod lru;
pub mod lru_order_cache;
pub mod moka_cache;
pub mod recency_list;

// Re-exports
pub use error::{CacheError, ListError};
pub use lru::BoundedLruCache;
pub use lru_order_cache::LruOrderCache;
pub use moka_cache::{MokaCacheConfig, MokaOrderCache};
pub use recency_list::{NodeId, RecencyList};

use std::sync::Arc;

use orderflow_core::OrderCache;

use crate::settings::{CacheBackend, CacheSettings};

/// Builds the cache backend selected in the settings.
pub fn build_cache(settings: &CacheSettings) -> Result<Arc<dyn OrderCache>, CacheError> {
    let cache: Arc<dyn OrderCache> = match settings.backend {
        CacheBackend::Lru => Arc::new(LruOrderCache::new(settings.capacity)?),
        CacheBackend::Moka => Arc::new(MokaOrderCache::new(MokaCacheConfig {
            max_capacity: settings.capacity as u64,
            time_to_idle: settings.time_to_idle(),
        })?),
    };
    Ok(cache)
}
