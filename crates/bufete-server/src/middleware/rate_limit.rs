//! Limite de requests por cliente para la API de administracion.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::AppError;
use crate::metrics::record_rate_limit_rejection;
use crate::state::AppState;

/// Header con los requests restantes en la ventana.
pub static RATE_LIMIT_REMAINING_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining");

const ANONYMOUS_CLIENT: &str = "anonymous";

/// Identifica al cliente de un request.
///
/// Con `trust_proxy_headers` usa la primera entrada de `x-forwarded-for` y
/// luego `x-real-ip`. Sin proxy de confianza esos headers los pone el propio
/// cliente, asi que solo cuenta la direccion de la conexion.
pub fn client_id(request: &Request<Body>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(client) = forwarded_client(request) {
            return client.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

fn forwarded_client(request: &Request<Body>) -> Option<&str> {
    let headers = request.headers();

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip)
}

/// Rechaza con 429 a los clientes que agotaron su ventana.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = state.rate_limiter();
    let client = client_id(&request, limiter.config().trust_proxy_headers);
    let decision = limiter.check(&client).await;

    if !decision.allowed {
        record_rate_limit_rejection();
        warn!(client = %client, "Rate limit exceeded");
        let mut response = AppError::TooManyRequests {
            retry_after_secs: limiter.config().window.as_secs(),
        }
        .into_response();
        response
            .headers_mut()
            .insert(RATE_LIMIT_REMAINING_HEADER.clone(), HeaderValue::from(0u32));
        return response;
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        RATE_LIMIT_REMAINING_HEADER.clone(),
        HeaderValue::from(decision.remaining),
    );
    response
}
