//! Pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated by the ingestion loop and its dispatch tasks.
#[derive(Debug, Default)]
pub struct PipelineStats {
    consumed: AtomicU64,
    invalid: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    decode_errors: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    /// Decoded messages handed to the loop, retries included.
    pub consumed: u64,
    /// Messages rejected by validation.
    pub invalid: u64,
    /// Messages processed and acknowledged.
    pub processed: u64,
    /// Failed processing attempts.
    pub failed: u64,
    /// Payloads that could not be decoded.
    pub decode_errors: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of all counters.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            consumed: self.consumed.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}
