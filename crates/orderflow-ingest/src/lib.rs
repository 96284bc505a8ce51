//! # Orderflow Ingest
//!
//! Asynchronous order ingestion for the Orderflow order service.
//!
//! The crate wraps an at-least-once message transport with a bounded,
//! time-ordered retry backlog and a dead-letter sink, and drives the
//! consume → validate → dispatch → acknowledge loop on top of it.
//!
//! ## Features
//!
//! - Transport abstraction with an in-memory channel implementation
//! - Fixed-backoff retries held in a min-heap keyed by eligibility time
//! - Dead-lettering on permanent failure, retry exhaustion or backlog overflow
//! - Ingestion loop with tracked dispatch tasks and an idempotent stop handle
//!
//! ## Example
//!
//! ```ignore
//! use orderflow_ingest::{
//!     IngestionPipeline, LoggingDeadLetterSink, PipelineConfig, RetryConfig,
//!     RetryingMessageSource, transport,
//! };
//!
//! let (publisher, transport) = transport::channel(1024, Duration::from_millis(200));
//! let source = RetryingMessageSource::new(
//!     transport,
//!     Arc::new(LoggingDeadLetterSink),
//!     RetryConfig::default(),
//! );
//! let handle = IngestionPipeline::new(Arc::new(source), processor, PipelineConfig::default())
//!     .start();
//!
//! publisher.publish(payload).await?;
//! handle.shutdown(Duration::from_secs(10)).await?;
//! ```

pub mod error;
pub mod pipeline;
pub mod retry;
pub mod telemetry;
pub mod transport;

// Re-exports
pub use error::{IngestError, TransportError};
pub use pipeline::{
    IngestionPipeline, OrderProcessor, PipelineConfig, PipelineHandle, PipelineSnapshot,
    PipelineStats,
};
pub use retry::{
    DeadLetter, DeadLetterReason, DeadLetterSink, FailOutcome, InFlightMessage,
    LoggingDeadLetterSink, MemoryDeadLetterSink, RetryBacklog, RetryConfig,
    RetryingMessageSource,
};
pub use transport::{ChannelPublisher, ChannelTransport, MessageTransport, RawMessage};

// Re-export orderflow_core for consumers
pub use orderflow_core;
