use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    cache::{
        invalidate_all, invalidate_content, invalidate_key, invalidate_patterns,
        invalidate_prefix, revalidate,
    },
    content::{get_post, get_settings, list_categories, list_posts, list_services, list_tags},
    health::health_check,
    metrics::metrics_handler,
};
use crate::middleware::{LoggingLayer, RequestIdLayer, enforce_rate_limit, require_admin_token};
use crate::state::AppState;

/// Rutas publicas de contenido, de solo lectura.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/blog/posts", get(list_posts))
        .route("/blog/posts/{slug}", get(get_post))
        .route("/blog/categories", get(list_categories))
        .route("/blog/tags", get(list_tags))
        .route("/services", get(list_services))
        .route("/settings", get(get_settings))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
}

/// Rutas de administracion de la cache, con token y limite de requests.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/cache", delete(invalidate_all))
        .route("/cache/keys/{key}", delete(invalidate_key))
        .route("/cache/prefix/{prefix}", delete(invalidate_prefix))
        .route("/cache/patterns", post(invalidate_patterns))
        .route("/cache/revalidate", post(revalidate))
        .route("/cache/content/{kind}", post(invalidate_content))
        // El limite va por fuera: tambien cuenta los intentos sin token.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_rate_limit))
}

/// Creates the application router.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let app_router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes())
        .nest("/api/admin", admin_routes(&state))
        .with_state(state);

    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
}

/// Runs the server until a shutdown signal arrives.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
