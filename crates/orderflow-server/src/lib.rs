//! Orderflow Server - order lookup service
//!
//! Serves orders over HTTP from a bounded cache in front of the durable
//! store, and feeds the store from the ingestion pipeline.
//!
//! - [`cache`]: arena-backed recency list, bounded LRU cache and the
//!   [`OrderCache`](orderflow_core::OrderCache) backends
//! - [`storage`]: [`OrderStorage`](orderflow_core::OrderStorage) backends
//! - [`service`]: cache-aside [`OrderService`]
//! - [`server`]: axum router and graceful shutdown
//! - [`settings`]: layered configuration

pub mod cache;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod server;
pub mod service;
pub mod settings;
pub mod state;
pub mod storage;

#[cfg(test)]
mod fixtures;

pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router, run_server, shutdown_signal};
pub use service::OrderService;
pub use settings::{CacheBackend, Settings, SettingsError};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
