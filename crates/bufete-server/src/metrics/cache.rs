//! Cache metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("bufete_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("bufete_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "bufete_cache_errors_total",
        "Backend failures absorbed by the cache layer"
    );
    metrics::describe_counter!(
        "bufete_cache_invalidations_total",
        "Number of cache keys removed by invalidation"
    );
    metrics::describe_counter!(
        "bufete_rate_limit_rejections_total",
        "Requests rejected by the rate limiter"
    );
    metrics::describe_histogram!(
        "bufete_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para poder inspeccionarlos en tests y logs.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("bufete_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("bufete_cache_misses_total").increment(1);
    }

    /// Registra un fallo del backend absorbido por la cache
    pub fn record_error(&self, operation: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("bufete_cache_errors_total", "operation" => operation.to_string()).increment(1);
    }

    /// Registra keys eliminadas por una invalidacion
    pub fn record_invalidation(&self, kind: &str, count: u64) {
        counter!("bufete_cache_invalidations_total", "kind" => kind.to_string()).increment(count);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "bufete_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de errores de backend
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Registra un request rechazado por el rate limiter.
pub fn record_rate_limit_rejection() {
    counter!("bufete_rate_limit_rejections_total").increment(1);
}
