//! Application state.

use std::sync::Arc;

use orderflow_ingest::{ChannelPublisher, MemoryDeadLetterSink};

use crate::service::OrderService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<OrderService>,
    publisher: ChannelPublisher,
    /// Present when dead letters are kept in memory.
    dead_letters: Option<Arc<MemoryDeadLetterSink>>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(service: Arc<OrderService>, publisher: ChannelPublisher) -> Self {
        Self {
            service,
            publisher,
            dead_letters: None,
        }
    }

    /// Exposes the in-memory dead letters over HTTP.
    pub fn with_dead_letters(mut self, sink: Arc<MemoryDeadLetterSink>) -> Self {
        self.dead_letters = Some(sink);
        self
    }

    pub fn service(&self) -> &OrderService {
        self.service.as_ref()
    }

    /// Producer side of the ingestion transport.
    pub fn publisher(&self) -> &ChannelPublisher {
        &self.publisher
    }

    pub fn dead_letters(&self) -> Option<&MemoryDeadLetterSink> {
        self.dead_letters.as_deref()
    }
}
