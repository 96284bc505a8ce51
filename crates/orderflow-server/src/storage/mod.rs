//! Storage backends.
//!
//! A relational store plugs in behind [`OrderStorage`](orderflow_core::OrderStorage);
//! the server ships with the in-memory implementation.

mod memory;

pub use memory::InMemoryOrderStorage;
