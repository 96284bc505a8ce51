//! Message transport abstraction.
//!
//! A transport delivers raw payloads at least once and tracks acknowledged
//! offsets. Production deployments put a broker client behind
//! [`MessageTransport`]; [`ChannelTransport`] is the in-process
//! implementation used by the server binary and the tests.

mod channel;

pub use channel::{ChannelPublisher, ChannelTransport, channel};

use async_trait::async_trait;

use crate::error::TransportError;

/// A raw message as read from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    offset: u64,
    payload: Vec<u8>,
}

impl RawMessage {
    /// Creates a new raw message.
    pub fn new(offset: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            payload: payload.into(),
        }
    }

    /// Returns the transport offset, the handle used for commits.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the undecoded payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the message, returning its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// An at-least-once source of raw messages.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Reads the next message.
    ///
    /// Waits up to the transport's poll window. `Ok(None)` means nothing
    /// arrived in that window; callers are expected to poll again.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` once no more messages can arrive
    /// - `TransportError::Read` on any other failure
    async fn read_message(&self) -> Result<Option<RawMessage>, TransportError>;

    /// Acknowledges a message so it is not redelivered.
    async fn commit(&self, message: &RawMessage) -> Result<(), TransportError>;

    /// Returns the name of this transport, used for logging.
    fn name(&self) -> &str;
}
