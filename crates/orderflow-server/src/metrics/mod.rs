//! Metrics module for the Orderflow server.

pub mod cache;
pub mod http;
pub mod setup;

pub use cache::{CacheMetrics, register_cache_metrics};
pub use http::register_http_metrics;
pub use setup::{detached_handle, init_metrics};
