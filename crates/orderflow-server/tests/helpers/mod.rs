//! Test helpers para orderflow-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod client;
pub mod orders;

pub use app::{TestApp, client, wait_until};
pub use client::{TestClient, TestResponse};
pub use orders::{order_created_at, sample_order};
