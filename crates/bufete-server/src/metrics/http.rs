//! HTTP metrics middleware.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;

/// Middleware que registra metricas HTTP para cada request.
///
/// El label `path` usa la ruta registrada (`/api/blog/posts/{slug}`) para
/// no crear una serie por cada slug.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = route_label(matched_path.as_ref());

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    counter!(
        "bufete_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string(),
        "class" => status_class(status.as_u16())
    )
    .increment(1);

    histogram!(
        "bufete_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration.as_secs_f64());

    response
}

fn route_label(matched_path: Option<&MatchedPath>) -> String {
    matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Registra las metricas HTTP
pub fn register_http_metrics() {
    metrics::describe_counter!(
        "bufete_http_requests_total",
        "Total number of HTTP requests"
    );
    metrics::describe_histogram!(
        "bufete_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
}
