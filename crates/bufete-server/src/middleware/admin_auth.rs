//! Autenticacion por token de la API de administracion.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Exige `Authorization: Bearer <token>` con el token configurado.
///
/// Sin token configurado la API responde 403 a todo.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token() else {
        return AppError::Forbidden("The admin API is disabled".to_string()).into_response();
    };

    let authorized = bearer_token(&request)
        .is_some_and(|provided| bool::from(provided.as_bytes().ct_eq(expected.as_bytes())));

    if !authorized {
        warn!(path = %request.uri().path(), "Rejected admin request");
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}
