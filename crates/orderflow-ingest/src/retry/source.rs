//! Retrying wrapper around a message transport.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use orderflow_core::Order;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{DeadLetter, DeadLetterReason, DeadLetterSink, InFlightMessage, RetryBacklog};
use crate::error::{IngestError, TransportError};
use crate::telemetry;
use crate::transport::{MessageTransport, RawMessage};

/// Retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Failed attempts allowed before a message is dead-lettered.
    pub max_retries: u32,
    /// Maximum number of messages waiting for a retry.
    pub retry_capacity: usize,
    /// Delay between a failure and the next attempt.
    pub fixed_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_capacity: 1024,
            fixed_backoff: Duration::from_secs(5),
        }
    }
}

/// What [`RetryingMessageSource::on_fail`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// Scheduled for another attempt.
    Retried { tries: u32, retry_after: Instant },
    /// Taken out of circulation and committed.
    DeadLettered(DeadLetterReason),
}

/// An at-least-once source with fixed-backoff retries and dead-lettering.
///
/// Failed messages wait in a bounded [`RetryBacklog`]. `consume` prefers an
/// eligible retry over a fresh read, so retries are not starved by a busy
/// transport. A message leaves the source in exactly one of three ways:
/// acknowledged by [`on_success`](Self::on_success), dead-lettered, or lost
/// with the process (the backlog is not persisted).
pub struct RetryingMessageSource<T, V = Order> {
    transport: T,
    sink: Arc<dyn DeadLetterSink>,
    config: RetryConfig,
    backlog: Mutex<RetryBacklog<V>>,
    _value: PhantomData<fn() -> V>,
}

impl<T, V> RetryingMessageSource<T, V>
where
    T: MessageTransport,
    V: DeserializeOwned + Send,
{
    pub fn new(transport: T, sink: Arc<dyn DeadLetterSink>, config: RetryConfig) -> Self {
        let backlog = RetryBacklog::new(config.retry_capacity);
        Self {
            transport,
            sink,
            config,
            backlog: Mutex::new(backlog),
            _value: PhantomData,
        }
    }

    /// Returns the next message to process.
    ///
    /// An eligible retry wins over the transport. `Ok(None)` means nothing
    /// was available within the transport's poll window.
    ///
    /// # Errors
    ///
    /// - `IngestError::Decode` if the payload is not a valid `V`; the message
    ///   has already been dead-lettered and committed
    /// - `IngestError::Transport` if the transport failed. `Closed` is only
    ///   reported once the retry backlog is empty.
    pub async fn consume(&self) -> Result<Option<InFlightMessage<V>>, IngestError> {
        let retried = self.backlog.lock().pop_eligible(Instant::now());
        if let Some(message) = retried {
            debug!(
                offset = message.offset(),
                tries = message.tries(),
                "Retrying message"
            );
            telemetry::record_consumed("retry");
            telemetry::set_backlog_size(self.backlog_len());
            return Ok(Some(message));
        }

        let raw = match self.transport.read_message().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(TransportError::Closed) => return self.wait_for_backlog().await,
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<V>(raw.payload()) {
            Ok(value) => {
                telemetry::record_consumed("fresh");
                Ok(Some(InFlightMessage::fresh(raw, value)))
            }
            Err(source) => {
                let offset = raw.offset();
                warn!(offset, error = %source, "Undecodable message");
                self.dead_letter(raw, 0, DeadLetterReason::Undecodable, source.to_string())
                    .await?;
                Err(IngestError::Decode { offset, source })
            }
        }
    }

    /// Acknowledges a processed message.
    pub async fn on_success(&self, message: InFlightMessage<V>) -> Result<(), IngestError> {
        let raw = message.into_raw();
        self.transport.commit(&raw).await?;
        debug!(offset = raw.offset(), "Message committed");
        Ok(())
    }

    /// Handles a failed attempt.
    ///
    /// A permanent failure (`should_retry == false`) or an exhausted retry
    /// budget dead-letters the message. Otherwise it is scheduled after the
    /// fixed backoff; a full backlog dead-letters instead of waiting.
    pub async fn on_fail(
        &self,
        message: InFlightMessage<V>,
        should_retry: bool,
        cause: impl Into<String>,
    ) -> Result<FailOutcome, IngestError> {
        let cause = cause.into();

        if !should_retry {
            let tries = message.tries();
            return self
                .dead_letter_message(message, tries, DeadLetterReason::Invalid, cause)
                .await;
        }

        let tries = message.tries() + 1;
        if tries > self.config.max_retries {
            info!(
                offset = message.offset(),
                tries,
                max_retries = self.config.max_retries,
                "Max retries reached"
            );
            return self
                .dead_letter_message(message, tries, DeadLetterReason::MaxRetriesExceeded, cause)
                .await;
        }

        let retried = message.retry(self.config.fixed_backoff);
        let retry_after = retried.retry_after().unwrap_or_else(Instant::now);
        let offset = retried.offset();

        let pushed = self.backlog.lock().push(retried);
        match pushed {
            Ok(()) => {
                info!(offset, tries, cause = %cause, "Message scheduled for retry");
                telemetry::record_retry();
                telemetry::set_backlog_size(self.backlog_len());
                Ok(FailOutcome::Retried { tries, retry_after })
            }
            Err(rejected) => {
                warn!(offset, tries, "Retry overflow, dead-lettering");
                self.dead_letter_message(rejected, tries, DeadLetterReason::RetryOverflow, cause)
                    .await
            }
        }
    }

    /// Number of messages waiting for a retry.
    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().len()
    }

    /// Deadline of the earliest pending retry.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.backlog.lock().next_retry_at()
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Returns the wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// After the transport closed, keeps serving the backlog until it drains.
    async fn wait_for_backlog(&self) -> Result<Option<InFlightMessage<V>>, IngestError> {
        let next = self.next_retry_at();
        match next {
            Some(at) => {
                tokio::time::sleep_until(at).await;
                Ok(None)
            }
            None => Err(TransportError::Closed.into()),
        }
    }

    async fn dead_letter_message(
        &self,
        message: InFlightMessage<V>,
        tries: u32,
        reason: DeadLetterReason,
        cause: String,
    ) -> Result<FailOutcome, IngestError> {
        self.dead_letter(message.into_raw(), tries, reason, cause)
            .await?;
        Ok(FailOutcome::DeadLettered(reason))
    }

    /// Sends a message to the sink and commits it. Sink failures are logged.
    async fn dead_letter(
        &self,
        raw: RawMessage,
        tries: u32,
        reason: DeadLetterReason,
        cause: String,
    ) -> Result<(), IngestError> {
        let letter = DeadLetter::new(raw.offset(), raw.payload().to_vec(), tries, reason, cause);
        if let Err(e) = self.sink.send(letter).await {
            error!(
                offset = raw.offset(),
                sink = self.sink.name(),
                error = %e,
                "Dead-letter sink failed"
            );
        }
        telemetry::record_dead_letter(reason.as_str());

        self.transport.commit(&raw).await?;
        Ok(())
    }
}

impl<T: MessageTransport, V> std::fmt::Debug for RetryingMessageSource<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingMessageSource")
            .field("transport", &self.transport.name())
            .field("sink", &self.sink.name())
            .field("config", &self.config)
            .field("backlog_len", &self.backlog.lock().len())
            .finish()
    }
}
