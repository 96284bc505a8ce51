//! Ingestion metrics.
//!
//! Recorded through the `metrics` facade; the binary decides which exporter
//! receives them.

use metrics::{counter, gauge};

pub const MESSAGES_CONSUMED: &str = "orderflow_ingest_messages_total";
pub const RETRIES: &str = "orderflow_ingest_retries_total";
pub const DEAD_LETTERS: &str = "orderflow_ingest_dead_letters_total";
pub const RETRY_BACKLOG: &str = "orderflow_ingest_retry_backlog";
pub const DISPATCH_OUTCOMES: &str = "orderflow_ingest_dispatch_total";

/// Describes the ingestion metrics. Call once at startup.
pub fn describe_ingest_metrics() {
    metrics::describe_counter!(
        MESSAGES_CONSUMED,
        "Messages handed to the pipeline, by origin (fresh or retry)"
    );
    metrics::describe_counter!(RETRIES, "Messages scheduled for another attempt");
    metrics::describe_counter!(DEAD_LETTERS, "Messages dead-lettered, by reason");
    metrics::describe_gauge!(RETRY_BACKLOG, "Messages waiting in the retry backlog");
    metrics::describe_counter!(DISPATCH_OUTCOMES, "Order dispatches, by outcome");
}

pub(crate) fn record_consumed(origin: &'static str) {
    counter!(MESSAGES_CONSUMED, "origin" => origin).increment(1);
}

pub(crate) fn record_retry() {
    counter!(RETRIES).increment(1);
}

pub(crate) fn record_dead_letter(reason: &'static str) {
    counter!(DEAD_LETTERS, "reason" => reason).increment(1);
}

pub(crate) fn set_backlog_size(size: usize) {
    gauge!(RETRY_BACKLOG).set(size as f64);
}

pub(crate) fn record_dispatch(outcome: &'static str) {
    counter!(DISPATCH_OUTCOMES, "outcome" => outcome).increment(1);
}
