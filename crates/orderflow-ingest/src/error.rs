//! Error types for order ingestion.

use std::time::Duration;

/// Errors raised by a message transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The transport will never deliver another message.
    #[error("transport closed")]
    Closed,

    /// Reading the next message failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Committing an offset failed.
    #[error("commit of offset {offset} failed: {reason}")]
    Commit { offset: u64, reason: String },
}

/// Errors that can occur while ingesting orders.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A raw message could not be decoded. It has already been dead-lettered.
    #[error("failed to decode message at offset {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },

    /// The dead-letter sink rejected a message.
    #[error("dead-letter sink error: {0}")]
    DeadLetter(String),

    /// The pipeline did not finish within the shutdown timeout.
    #[error("pipeline did not stop within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    /// The pipeline task panicked or was cancelled.
    #[error("pipeline task failed: {0}")]
    TaskFailed(String),
}

impl IngestError {
    /// Creates a new dead-letter error.
    pub fn dead_letter(msg: impl Into<String>) -> Self {
        Self::DeadLetter(msg.into())
    }

    /// Returns true if the transport is closed and the loop should end.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Closed))
    }
}
