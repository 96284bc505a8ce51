//! In-flight message state.

use std::time::Duration;

use tokio::time::Instant;

use crate::transport::RawMessage;

/// A consumed message that has not been acknowledged or dead-lettered yet.
///
/// Keeps the decoded value so retries do not decode again, and the raw
/// message so the offset can be committed. A failure never mutates an
/// instance: [`InFlightMessage::retry`] consumes it and returns its
/// successor, so a message is owned either by the active path or by the
/// retry backlog, never both.
#[derive(Debug)]
pub struct InFlightMessage<V> {
    raw: RawMessage,
    value: V,
    tries: u32,
    retry_after: Option<Instant>,
}

impl<V> InFlightMessage<V> {
    /// Wraps a freshly read message.
    pub fn fresh(raw: RawMessage, value: V) -> Self {
        Self {
            raw,
            value,
            tries: 0,
            retry_after: None,
        }
    }

    /// Produces the next attempt: one more try, eligible after `backoff`.
    pub fn retry(self, backoff: Duration) -> Self {
        Self {
            raw: self.raw,
            value: self.value,
            tries: self.tries + 1,
            retry_after: Some(Instant::now() + backoff),
        }
    }

    /// Returns the decoded value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the raw message.
    pub fn raw(&self) -> &RawMessage {
        &self.raw
    }

    /// Returns the transport offset.
    pub fn offset(&self) -> u64 {
        self.raw.offset()
    }

    /// Number of failed attempts so far.
    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Earliest instant at which the message may be retried.
    pub fn retry_after(&self) -> Option<Instant> {
        self.retry_after
    }

    /// Returns true if the message may be offered at `now`.
    pub fn is_eligible(&self, now: Instant) -> bool {
        self.retry_after.is_none_or(|at| at <= now)
    }

    /// Consumes the message, returning the raw part.
    pub fn into_raw(self) -> RawMessage {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fresh_message_is_eligible() {
        let message = InFlightMessage::fresh(RawMessage::new(4, b"{}".to_vec()), ());

        assert_eq!(message.tries(), 0);
        assert!(message.retry_after().is_none());
        assert!(message.is_eligible(Instant::now()));
        assert_eq!(message.offset(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_increments_tries_and_sets_deadline() {
        let message = InFlightMessage::fresh(RawMessage::new(1, b"{}".to_vec()), "v");
        let before = Instant::now();

        let retried = message.retry(Duration::from_secs(5));

        assert_eq!(retried.tries(), 1);
        assert_eq!(retried.retry_after(), Some(before + Duration::from_secs(5)));
        assert!(!retried.is_eligible(Instant::now()));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(retried.is_eligible(Instant::now()));

        let again = retried.retry(Duration::from_secs(5));
        assert_eq!(again.tries(), 2);
        assert_eq!(*again.value(), "v");
    }
}
