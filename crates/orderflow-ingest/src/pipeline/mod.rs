//! Ingestion loop.
//!
//! [`IngestionPipeline`] pulls orders from a [`RetryingMessageSource`],
//! validates them and hands valid ones to an [`OrderProcessor`].
//!
//! | outcome            | action                                   |
//! |--------------------|------------------------------------------|
//! | processed          | offset committed                         |
//! | processing failed  | retried after backoff, then dead-lettered |
//! | invalid            | dead-lettered and committed              |
//! | undecodable        | dead-lettered and committed              |
//!
//! [`RetryingMessageSource`]: crate::retry::RetryingMessageSource

mod handle;
mod processor;
mod runner;
mod stats;

pub use handle::PipelineHandle;
pub use processor::OrderProcessor;
pub use runner::{IngestionPipeline, PipelineConfig};
pub use stats::{PipelineSnapshot, PipelineStats};
