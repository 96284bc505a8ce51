//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!(
        "orderflow_cache_hits_total",
        "Total number of order cache hits"
    );
    metrics::describe_counter!(
        "orderflow_cache_misses_total",
        "Total number of order cache misses"
    );
    metrics::describe_counter!(
        "orderflow_cache_evictions_total",
        "Total number of order cache evictions"
    );
    metrics::describe_gauge!(
        "orderflow_cache_entries",
        "Current number of orders in cache"
    );
    metrics::describe_histogram!(
        "orderflow_cache_operation_seconds",
        "Time spent on order cache operations"
    );
}

/// Recorder de metricas de cache, etiquetado por backend.
/// Los contadores internos permiten calcular el hit rate sin el exporter.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    backend: &'static str,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("orderflow_cache_hits_total", "backend" => self.backend).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("orderflow_cache_misses_total", "backend" => self.backend).increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &'static str) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!(
            "orderflow_cache_evictions_total",
            "backend" => self.backend,
            "reason" => reason
        )
        .increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("orderflow_cache_entries", "backend" => self.backend).set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(
            "orderflow_cache_operation_seconds",
            "backend" => self.backend,
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new("lru");

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert!((metrics.hit_rate() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_empty_hit_rate_is_zero() {
        assert_eq!(CacheMetrics::new("lru").hit_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new("moka");
        let listener_copy = metrics.clone();

        listener_copy.record_eviction("capacity");
        metrics.record_miss();

        assert_eq!(metrics.evictions(), 1);
        assert_eq!(listener_copy.misses(), 1);
        assert_eq!(metrics.hits(), 0);
    }
}
