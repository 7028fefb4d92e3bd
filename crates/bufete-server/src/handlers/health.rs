//! Health endpoint.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: CacheHealth,
    pub content: ContentHealth,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub enabled: bool,
    /// Nombre del backend, ausente en pass-through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub hit_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ContentHealth {
    pub source: String,
    pub status: &'static str,
}

/// GET /health
///
/// El servicio esta `UP` mientras responda; la cache y el contenido se
/// reportan por separado.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache();
    let content = state.content();

    let content_status = match content.health_check().await {
        Ok(()) => "UP",
        Err(e) => {
            warn!(source = %content.name(), error = %e, "Content source health check failed");
            "DOWN"
        },
    };

    Json(HealthResponse {
        status: "UP",
        cache: CacheHealth {
            enabled: cache.is_enabled(),
            backend: cache.backend_name().map(str::to_string),
            hit_rate: cache.metrics().hit_rate(),
        },
        content: ContentHealth {
            source: content.name().to_string(),
            status: content_status,
        },
    })
}
