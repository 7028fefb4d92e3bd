//! Admin endpoints for cache invalidation and page revalidation.

use axum::{
    Json,
    extract::{Path, State},
};
use bufete_core::RevalidateKind;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::response::ApiResponse;
use crate::cache::{ContentInvalidation, ContentKind, InvalidationResult};
use crate::error::AppError;
use crate::state::AppState;

/// Request body para invalidación por patrones múltiples.
#[derive(Debug, Deserialize)]
pub struct InvalidateByPatternsRequest {
    /// Lista de patrones glob a invalidar.
    pub patterns: Vec<String>,
}

/// Request body de POST /cache/revalidate.
#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: RevalidateKind,
}

#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RevalidateKind,
    pub revalidated: bool,
}

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub flushed: bool,
}

/// DELETE /cache
#[instrument(skip_all)]
pub async fn invalidate_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FlushResponse>>, AppError> {
    if !state.cache().is_enabled() {
        return Err(AppError::Unavailable("Cache is not enabled".to_string()));
    }

    if !state.cache().invalidate_all_cache().await {
        return Err(AppError::Unavailable("Cache flush failed".to_string()));
    }

    info!("Cache flushed from admin API");
    Ok(Json(ApiResponse::ok(FlushResponse { flushed: true })))
}

/// DELETE /cache/keys/{key}
#[instrument(skip_all, fields(key = %key))]
pub async fn invalidate_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ApiResponse<InvalidationResult>> {
    Json(ApiResponse::ok(state.cache().invalidate_cache(&key).await))
}

/// DELETE /cache/prefix/{prefix}
#[instrument(skip_all, fields(prefix = %prefix))]
pub async fn invalidate_prefix(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<ApiResponse<InvalidationResult>> {
    Json(ApiResponse::ok(
        state.cache().invalidate_cache_by_prefix(&prefix).await,
    ))
}

/// POST /cache/patterns
#[instrument(skip_all, fields(patterns = request.patterns.len()))]
pub async fn invalidate_patterns(
    State(state): State<AppState>,
    Json(request): Json<InvalidateByPatternsRequest>,
) -> Result<Json<ApiResponse<InvalidationResult>>, AppError> {
    if request.patterns.is_empty() {
        return Err(AppError::BadRequest("patterns must not be empty".to_string()));
    }

    Ok(Json(ApiResponse::ok(
        state.cache().invalidate_by_patterns(request.patterns.as_slice()).await,
    )))
}

/// POST /cache/revalidate
///
/// Revalida la ruta y limpia las keys derivadas de ella.
#[instrument(skip_all, fields(path = %request.path))]
pub async fn revalidate(
    State(state): State<AppState>,
    Json(request): Json<RevalidateRequest>,
) -> Result<Json<ApiResponse<RevalidateResponse>>, AppError> {
    if !request.path.starts_with('/') {
        return Err(AppError::BadRequest("path must start with '/'".to_string()));
    }

    let revalidated = state
        .cache()
        .revalidate_and_clear_cache_as(&request.path, request.kind)
        .await;

    if !revalidated {
        return Err(AppError::Unavailable(format!(
            "Revalidation of '{}' failed",
            request.path
        )));
    }

    Ok(Json(ApiResponse::ok(RevalidateResponse {
        path: request.path,
        kind: request.kind,
        revalidated,
    })))
}

/// POST /cache/content/{kind}
///
/// Para llamar despues de escribir contenido: limpia sus keys y revalida
/// las paginas que lo muestran.
#[instrument(skip_all, fields(kind = %kind))]
pub async fn invalidate_content(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<ContentInvalidation>>, AppError> {
    let kind: ContentKind = kind.parse().map_err(AppError::BadRequest)?;

    Ok(Json(ApiResponse::ok(
        state.cache().invalidate_content(kind).await,
    )))
}
