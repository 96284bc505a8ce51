//! Retrying message source.
//!
//! Wraps a [`MessageTransport`](crate::transport::MessageTransport) with:
//!
//! - a bounded backlog of failed messages, ordered by eligibility time
//! - fixed-delay backoff between attempts
//! - dead-lettering on permanent failure, retry exhaustion or overflow

mod backlog;
mod dead_letter;
mod message;
mod source;

pub use backlog::RetryBacklog;
pub use dead_letter::{
    DeadLetter, DeadLetterReason, DeadLetterSink, LoggingDeadLetterSink, MemoryDeadLetterSink,
};
pub use message::InFlightMessage;
pub use source::{FailOutcome, RetryConfig, RetryingMessageSource};
