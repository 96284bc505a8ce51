#![allow(dead_code)]
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use orderflow_core::{Delivery, Item, Order, OrderError, Payment};
use orderflow_ingest::{
    ChannelPublisher, ChannelTransport, IngestionPipeline, MemoryDeadLetterSink, OrderProcessor,
    PipelineConfig, RetryConfig, RetryingMessageSource, transport,
};
use parking_lot::Mutex;

/// Returns a fully valid order with the given id.
pub fn sample_order(order_uid: &str) -> Order {
    Order {
        order_uid: order_uid.to_string(),
        track_number: "WBILMTESTTRACK".to_string(),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Test Testov".to_string(),
            phone: "+9720000000".to_string(),
            zip: "2639809".to_string(),
            city: "Kiryat Mozkin".to_string(),
            address: "Ploshad Mira 15".to_string(),
            region: "Kraiot".to_string(),
            email: "test@gmail.com".to_string(),
        },
        payment: Payment {
            transaction: order_uid.to_string(),
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 1817,
            payment_dt: 1_637_907_727,
            bank: "alpha".to_string(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![Item {
            chrt_id: 9_934_930,
            track_number: "WBILMTESTTRACK".to_string(),
            price: 453,
            rid: "ab4219087a764ae0btest".to_string(),
            name: "Mascaras".to_string(),
            sale: 30,
            size: "0".to_string(),
            total_price: 317,
            nm_id: 2_389_212,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
        }],
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: "test".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "9".to_string(),
        sm_id: 99,
        date_created: Utc.with_ymd_and_hms(2021, 11, 26, 6, 22, 19).unwrap(),
        oof_shard: "1".to_string(),
    }
}

/// Serializes an order the way a producer would.
pub fn payload(order: &Order) -> Vec<u8> {
    serde_json::to_vec(order).unwrap()
}

/// Processor that fails a fixed number of times, optionally after a delay.
#[derive(Debug, Default)]
pub struct ScriptedProcessor {
    fail_first: usize,
    delay: Duration,
    calls: AtomicUsize,
    processed: Mutex<Vec<String>>,
}

impl ScriptedProcessor {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(times: usize) -> Self {
        Self {
            fail_first: times,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Adds a delay before every call, failing or not.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> Vec<String> {
        self.processed.lock().clone()
    }
}

#[async_trait]
impl OrderProcessor for ScriptedProcessor {
    async fn process(&self, order: &Order) -> Result<(), OrderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call < self.fail_first {
            return Err(OrderError::storage("connection reset"));
        }
        self.processed.lock().push(order.order_uid.clone());
        Ok(())
    }
}

/// A pipeline wired to an in-memory transport and dead-letter sink.
pub struct Harness {
    pub publisher: ChannelPublisher,
    pub source: Arc<RetryingMessageSource<ChannelTransport>>,
    pub sink: Arc<MemoryDeadLetterSink>,
    pub processor: Arc<ScriptedProcessor>,
}

impl Harness {
    pub fn new(processor: ScriptedProcessor, retry: RetryConfig) -> Self {
        let (publisher, transport) = transport::channel(64, Duration::from_millis(50));
        let sink = Arc::new(MemoryDeadLetterSink::new(64));
        let source = Arc::new(RetryingMessageSource::new(transport, sink.clone(), retry));
        Self {
            publisher,
            source,
            sink,
            processor: Arc::new(processor),
        }
    }

    pub fn pipeline(&self) -> IngestionPipeline<ChannelTransport> {
        IngestionPipeline::new(
            Arc::clone(&self.source),
            self.processor.clone(),
            PipelineConfig {
                error_backoff: Duration::from_millis(100),
            },
        )
    }
}

/// Retry policy with a short backoff.
pub fn fast_retries(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        retry_capacity: 16,
        fixed_backoff: Duration::from_millis(200),
    }
}

/// Polls `condition` until it holds, failing the test after 30s of
/// (possibly virtual) time.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
