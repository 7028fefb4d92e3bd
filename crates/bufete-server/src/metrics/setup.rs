//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::cache::register_cache_metrics;
use super::http::register_http_metrics;

/// Buckets de los histogramas, en segundos. Cubren desde un hit local
/// hasta el timeout del backend REST.
const BUCKETS: &[f64] = &[
    0.0001, // 100 microsegundos
    0.0005, // 500 microsegundos
    0.001,  // 1 milisegundo
    0.005,  // 5 milisegundos
    0.01,   // 10 milisegundos
    0.025,  // 25 milisegundos
    0.05,   // 50 milisegundos
    0.1,    // 100 milisegundos
    0.25,   // 250 milisegundos
    0.5,    // 500 milisegundos
    1.0,    // 1 segundo
    2.5,    // 2.5 segundos
    5.0,    // 5 segundos
];

/// Inicializa el sistema de metricas y retorna el handle para el endpoint.
///
/// Instala el recorder global, por lo que solo puede llamarse una vez por
/// proceso.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(BUCKETS)?
        .install_recorder()?;

    register_cache_metrics();
    register_http_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}

/// Crea un handle sin instalar el recorder global.
///
/// Las metricas emitidas no llegan a este handle; sirve para montar el
/// router en tests.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
