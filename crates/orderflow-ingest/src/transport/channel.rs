//! In-process transport backed by a tokio mpsc channel.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::debug;

use super::{MessageTransport, RawMessage};
use crate::error::TransportError;

/// Creates a connected publisher/transport pair.
///
/// `capacity` bounds the number of unread messages; `poll_interval` is how
/// long a single [`MessageTransport::read_message`] call waits.
pub fn channel(capacity: usize, poll_interval: Duration) -> (ChannelPublisher, ChannelTransport) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let publisher = ChannelPublisher {
        sender,
        next_offset: Arc::new(AtomicU64::new(0)),
    };
    let transport = ChannelTransport {
        receiver: AsyncMutex::new(receiver),
        poll_interval,
        committed: Mutex::new(BTreeSet::new()),
    };
    (publisher, transport)
}

/// Producer side of a [`ChannelTransport`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<RawMessage>,
    next_offset: Arc<AtomicU64>,
}

impl ChannelPublisher {
    /// Publishes a payload, waiting for channel capacity.
    ///
    /// Returns the offset assigned to the message.
    pub async fn publish(&self, payload: impl Into<Vec<u8>>) -> Result<u64, TransportError> {
        let offset = self.next_offset.fetch_add(1, Ordering::Relaxed);
        self.sender
            .send(RawMessage::new(offset, payload))
            .await
            .map_err(|_| TransportError::Closed)?;
        Ok(offset)
    }

    /// Returns true once the transport side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer side of the in-process transport.
#[derive(Debug)]
pub struct ChannelTransport {
    receiver: AsyncMutex<mpsc::Receiver<RawMessage>>,
    poll_interval: Duration,
    committed: Mutex<BTreeSet<u64>>,
}

impl ChannelTransport {
    /// Returns true if the offset has been committed.
    pub fn is_committed(&self, offset: u64) -> bool {
        self.committed.lock().contains(&offset)
    }

    /// Returns all committed offsets in ascending order.
    pub fn committed_offsets(&self) -> Vec<u64> {
        self.committed.lock().iter().copied().collect()
    }
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn read_message(&self) -> Result<Option<RawMessage>, TransportError> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(self.poll_interval, receiver.recv()).await {
            Ok(Some(message)) => Ok(Some(message)),
            Ok(None) => Err(TransportError::Closed),
            Err(_elapsed) => Ok(None),
        }
    }

    async fn commit(&self, message: &RawMessage) -> Result<(), TransportError> {
        let newly_committed = self.committed.lock().insert(message.offset());
        if !newly_committed {
            debug!(offset = message.offset(), "Offset already committed");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "channel"
    }
}
