//! Orderflow Core - Domain types and ports
//!
//! This crate provides the foundational types shared by the ingestion
//! pipeline and the order server:
//!
//! - [`Order`] and its sub-entities, in the JSON wire format used on the queue
//! - [`validate_order`], the permanent-failure gate of the ingestion path
//! - [`OrderError`], the error taxonomy of the synchronous read/write path
//! - [`OrderStorage`] and [`OrderCache`], the ports implemented by the
//!   durable store and the cache backends

pub mod error;
pub mod model;
pub mod ports;
pub mod validation;

pub use error::{OrderError, Result, ValidationError};
pub use model::{Delivery, Item, Order, Payment};
pub use ports::{OrderCache, OrderStorage};
pub use validation::validate_order;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
