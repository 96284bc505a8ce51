use std::sync::Arc;
use std::time::Duration;

use orderflow_core::{Order, validate_order};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::{OrderProcessor, PipelineHandle, PipelineStats};
use crate::error::IngestError;
use crate::retry::{InFlightMessage, RetryingMessageSource};
use crate::telemetry;
use crate::transport::MessageTransport;

/// Configuration for the ingestion loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pause after a consume error before polling again.
    pub error_backoff: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(1),
        }
    }
}

/// Consume → validate → dispatch → acknowledge loop.
///
/// Each valid order is processed on its own task. The stop signal is only
/// looked at between iterations, so an in-progress consume or dispatch is
/// never cut short.
pub struct IngestionPipeline<T> {
    source: Arc<RetryingMessageSource<T, Order>>,
    processor: Arc<dyn OrderProcessor>,
    config: PipelineConfig,
    stats: Arc<PipelineStats>,
}

impl<T> IngestionPipeline<T>
where
    T: MessageTransport + 'static,
{
    pub fn new(
        source: Arc<RetryingMessageSource<T, Order>>,
        processor: Arc<dyn OrderProcessor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            processor,
            config,
            stats: Arc::new(PipelineStats::new()),
        }
    }

    /// Returns the shared counters.
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Spawns the loop on the current runtime.
    ///
    /// Returns a handle that can be used to stop the pipeline.
    pub fn start(self) -> PipelineHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = self.stats();

        let task = tokio::spawn(self.run(shutdown_rx));

        PipelineHandle::new(shutdown_tx, task, stats)
    }

    /// Runs the loop until `shutdown_rx` reads `true`, its sender is
    /// dropped, or the transport closes. Waits for every in-flight dispatch
    /// before returning.
    ///
    /// After the transport closes the loop keeps going until no dispatch is
    /// in flight and the retry backlog is empty, so every consumed message
    /// ends up committed or dead-lettered.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut dispatches = JoinSet::new();

        info!(
            transport = self.source.transport().name(),
            "Ingestion pipeline started"
        );

        loop {
            if stop_requested(&mut shutdown_rx) {
                info!("Ingestion pipeline stopping");
                break;
            }

            while let Some(result) = dispatches.try_join_next() {
                reap(result);
            }

            let message = match self.source.consume().await {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) if e.is_closed() => {
                    if dispatches.is_empty() {
                        info!("Transport closed, ingestion pipeline stopping");
                        break;
                    }
                    // A failing dispatch re-queues its message, so settle
                    // them before deciding the source is drained.
                    debug!(
                        in_flight = dispatches.len(),
                        "Transport closed, settling in-flight dispatches"
                    );
                    while let Some(result) = dispatches.join_next().await {
                        reap(result);
                    }
                    continue;
                }
                Err(IngestError::Decode { offset, .. }) => {
                    debug!(offset, "Skipped undecodable message");
                    self.stats.record_decode_error();
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Error while receiving orders");
                    tokio::time::sleep(self.config.error_backoff).await;
                    continue;
                }
            };
            self.stats.record_consumed();

            if let Err(e) = validate_order(message.value()) {
                warn!(
                    order_uid = %message.value().order_uid,
                    offset = message.offset(),
                    error = %e,
                    "Invalid order"
                );
                self.stats.record_invalid();
                if let Err(e) = self.source.on_fail(message, false, e.to_string()).await {
                    error!(error = %e, "Failed to dead-letter invalid message");
                }
                continue;
            }

            dispatches.spawn(dispatch(
                Arc::clone(&self.source),
                Arc::clone(&self.processor),
                Arc::clone(&self.stats),
                message,
            ));
        }

        if !dispatches.is_empty() {
            debug!(in_flight = dispatches.len(), "Waiting for in-flight dispatches");
        }
        while let Some(result) = dispatches.join_next().await {
            reap(result);
        }

        info!(stats = ?self.stats.snapshot(), "Ingestion pipeline stopped");
    }
}

/// Processes one order and settles its message.
async fn dispatch<T: MessageTransport>(
    source: Arc<RetryingMessageSource<T, Order>>,
    processor: Arc<dyn OrderProcessor>,
    stats: Arc<PipelineStats>,
    message: InFlightMessage<Order>,
) {
    match processor.process(message.value()).await {
        Ok(()) => {
            stats.record_processed();
            telemetry::record_dispatch("processed");
            if let Err(e) = source.on_success(message).await {
                error!(error = %e, "Failed to commit processed message");
            }
        }
        Err(e) => {
            stats.record_failed();
            telemetry::record_dispatch("failed");
            error!(
                order_uid = %message.value().order_uid,
                tries = message.tries(),
                error = %e,
                "Error while processing order"
            );
            if let Err(e) = source.on_fail(message, true, e.to_string()).await {
                error!(error = %e, "Failed to schedule retry");
            }
        }
    }
}

fn stop_requested(shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    shutdown_rx.has_changed().is_err() || *shutdown_rx.borrow_and_update()
}

fn reap(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Dispatch task failed");
    }
}
