//! Dead-letter records and sinks.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::error::IngestError;

/// Why a message was taken out of circulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterReason {
    /// The payload could not be decoded.
    Undecodable,
    /// The message was rejected as a permanent failure.
    Invalid,
    /// The retry limit was exceeded.
    MaxRetriesExceeded,
    /// The retry backlog was full.
    RetryOverflow,
}

impl DeadLetterReason {
    /// Returns the reason as a label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undecodable => "undecodable",
            Self::Invalid => "invalid",
            Self::MaxRetriesExceeded => "max_retries_exceeded",
            Self::RetryOverflow => "retry_overflow",
        }
    }
}

impl std::fmt::Display for DeadLetterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message that will not be processed again.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetter {
    pub offset: u64,
    #[serde(with = "lossy_utf8")]
    pub payload: Vec<u8>,
    pub tries: u32,
    pub reason: DeadLetterReason,
    pub cause: String,
    pub dead_at: DateTime<Utc>,
}

impl DeadLetter {
    /// Creates a record stamped with the current time.
    pub fn new(
        offset: u64,
        payload: Vec<u8>,
        tries: u32,
        reason: DeadLetterReason,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            payload,
            tries,
            reason,
            cause: cause.into(),
            dead_at: Utc::now(),
        }
    }

    /// Returns the payload as text, replacing invalid UTF-8.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

mod lossy_utf8 {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(payload))
    }
}

/// Terminal destination for dead letters.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Stores a dead letter.
    async fn send(&self, letter: DeadLetter) -> Result<(), IngestError>;

    /// Returns the name of this sink, used for logging.
    fn name(&self) -> &str;
}

/// Writes dead letters to the log and drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDeadLetterSink;

#[async_trait]
impl DeadLetterSink for LoggingDeadLetterSink {
    async fn send(&self, letter: DeadLetter) -> Result<(), IngestError> {
        warn!(
            offset = letter.offset,
            tries = letter.tries,
            reason = %letter.reason,
            cause = %letter.cause,
            payload = %letter.payload_lossy(),
            "Message dead-lettered"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Keeps the most recent dead letters in memory.
///
/// When full the oldest record is dropped. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryDeadLetterSink {
    letters: Mutex<VecDeque<DeadLetter>>,
    capacity: usize,
}

impl MemoryDeadLetterSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            letters: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Returns a copy of the stored letters, oldest first.
    pub fn letters(&self) -> Vec<DeadLetter> {
        self.letters.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.letters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.lock().is_empty()
    }

    /// Removes and returns all stored letters.
    pub fn drain(&self) -> Vec<DeadLetter> {
        self.letters.lock().drain(..).collect()
    }
}

#[async_trait]
impl DeadLetterSink for MemoryDeadLetterSink {
    async fn send(&self, letter: DeadLetter) -> Result<(), IngestError> {
        if self.capacity == 0 {
            return Err(IngestError::dead_letter("memory sink has zero capacity"));
        }

        let mut letters = self.letters.lock();
        if letters.len() >= self.capacity {
            letters.pop_front();
        }
        letters.push_back(letter);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(offset: u64) -> DeadLetter {
        DeadLetter::new(
            offset,
            b"{\"order_uid\":\"x\"}".to_vec(),
            0,
            DeadLetterReason::Invalid,
            "delivery.email has invalid format",
        )
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_most_recent() {
        let sink = MemoryDeadLetterSink::new(2);

        for offset in 0..3 {
            sink.send(letter(offset)).await.unwrap();
        }

        let offsets: Vec<u64> = sink.letters().iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![1, 2]);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_zero_capacity_sink_rejects() {
        let sink = MemoryDeadLetterSink::new(0);
        assert!(matches!(
            sink.send(letter(0)).await,
            Err(IngestError::DeadLetter(_))
        ));
    }

    #[tokio::test]
    async fn test_logging_sink_accepts() {
        assert!(LoggingDeadLetterSink.send(letter(9)).await.is_ok());
    }

    #[test]
    fn test_dead_letter_serializes_payload_as_text() {
        let json = serde_json::to_value(letter(5)).unwrap();

        assert_eq!(json["offset"], 5);
        assert_eq!(json["reason"], "invalid");
        assert_eq!(json["payload"], "{\"order_uid\":\"x\"}");
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(DeadLetterReason::Undecodable.as_str(), "undecodable");
        assert_eq!(
            DeadLetterReason::MaxRetriesExceeded.to_string(),
            "max_retries_exceeded"
        );
        assert_eq!(DeadLetterReason::RetryOverflow.as_str(), "retry_overflow");
    }
}
