//! Orderflow Server binary.

use std::sync::Arc;

use anyhow::Context;
use orderflow_ingest::{
    DeadLetterSink, IngestionPipeline, LoggingDeadLetterSink, MemoryDeadLetterSink,
    RetryingMessageSource, transport,
};
use orderflow_server::{
    AppState, OrderService, Settings, cache::build_cache, metrics::init_metrics, run_server,
    storage::InMemoryOrderStorage,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr = settings.server.socket_addr()?;

    tracing::info!(
        "Starting Orderflow Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        cache = ?settings.cache.backend,
        capacity = settings.cache.capacity,
        max_retries = settings.ingest.max_retries,
        "Settings loaded"
    );

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let storage = Arc::new(InMemoryOrderStorage::new());
    let cache = build_cache(&settings.cache).context("failed to build cache")?;
    let service = Arc::new(OrderService::new(storage, cache));

    if settings.cache.warmup_limit > 0
        && let Err(e) = service.cache_last_orders(settings.cache.warmup_limit).await
    {
        tracing::warn!(error = %e, "Starting with a cold cache");
    }

    // Ingestion
    let (publisher, transport) = transport::channel(
        settings.ingest.channel_capacity,
        settings.ingest.poll_interval(),
    );

    let memory_sink = (settings.ingest.dead_letter_capacity > 0)
        .then(|| Arc::new(MemoryDeadLetterSink::new(settings.ingest.dead_letter_capacity)));
    let sink: Arc<dyn DeadLetterSink> = match &memory_sink {
        Some(sink) => sink.clone(),
        None => Arc::new(LoggingDeadLetterSink),
    };

    let source = RetryingMessageSource::new(transport, sink, settings.ingest.retry_config());
    let pipeline = IngestionPipeline::new(
        Arc::new(source),
        service.clone(),
        settings.ingest.pipeline_config(),
    )
    .start();

    let mut state = AppState::new(service.clone(), publisher);
    if let Some(sink) = memory_sink {
        state = state.with_dead_letters(sink);
    }

    // Run server
    let served = run_server(addr, state, prometheus_handle).await;

    tracing::info!("Stopping ingestion pipeline");
    match pipeline.shutdown(settings.shutdown_timeout()).await {
        Ok(stats) => tracing::info!(?stats, "Ingestion pipeline stopped"),
        Err(e) => tracing::error!(error = %e, "Ingestion pipeline did not stop cleanly"),
    }
    service.flush().await;

    served.context("server error")?;
    Ok(())
}
