//! Router completo sobre backends en memoria.

use std::sync::Arc;
use std::time::Duration;

use orderflow_core::Order;
use orderflow_ingest::{
    ChannelTransport, IngestionPipeline, MemoryDeadLetterSink, PipelineConfig, PipelineHandle,
    RetryConfig, RetryingMessageSource, transport,
};
use orderflow_server::{
    AppState, OrderService, cache::LruOrderCache, create_router, metrics::detached_handle,
    storage::InMemoryOrderStorage,
};

use super::client::TestClient;

pub struct TestApp {
    pub client: TestClient,
    pub service: Arc<OrderService>,
    pub cache: Arc<LruOrderCache>,
    pub dead_letters: Arc<MemoryDeadLetterSink>,
    transport: Option<ChannelTransport>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_orders(Vec::new())
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        let storage = Arc::new(InMemoryOrderStorage::with_orders(orders));
        let cache = Arc::new(LruOrderCache::new(16).unwrap());
        let service = Arc::new(OrderService::new(storage, cache.clone()));
        let dead_letters = Arc::new(MemoryDeadLetterSink::new(16));

        let (publisher, transport) = transport::channel(64, Duration::from_millis(20));
        let state =
            AppState::new(service.clone(), publisher).with_dead_letters(dead_letters.clone());

        Self {
            client: TestClient::new(create_router(state, detached_handle())),
            service,
            cache,
            dead_letters,
            transport: Some(transport),
        }
    }

    /// Arranca el pipeline de ingesta sobre el transporte del router.
    pub fn start_pipeline(&mut self) -> PipelineHandle {
        let transport = self.transport.take().expect("pipeline already started");
        let source = RetryingMessageSource::new(
            transport,
            self.dead_letters.clone(),
            RetryConfig {
                fixed_backoff: Duration::from_millis(50),
                ..RetryConfig::default()
            },
        );
        IngestionPipeline::new(
            Arc::new(source),
            self.service.clone(),
            PipelineConfig::default(),
        )
        .start()
    }

    /// Lee el siguiente mensaje publicado sin pasar por el pipeline.
    pub async fn next_published(&self) -> Option<Vec<u8>> {
        use orderflow_ingest::MessageTransport;

        let transport = self.transport.as_ref()?;
        transport
            .read_message()
            .await
            .ok()
            .flatten()
            .map(|m| m.into_payload())
    }
}

/// Crea un TestClient con un router vacio.
pub fn client() -> TestClient {
    TestApp::new().client
}

/// Espera hasta que `condition` sea true.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
