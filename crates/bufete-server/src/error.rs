use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::content::ContentError;

#[derive(Debug)]
pub enum AppError {
    /// Recurso no encontrado
    NotFound { resource: String, id: String },

    /// Parametros invalidos
    BadRequest(String),

    /// Falta el token de administracion o es incorrecto
    Unauthorized,

    /// La API de administracion no esta habilitada
    Forbidden(String),

    /// Demasiados requests en la ventana actual
    TooManyRequests { retry_after_secs: u64 },

    /// El backend de contenido fallo
    Upstream(String),

    /// Un colaborador no esta disponible
    Unavailable(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, error, message) = match self {
            AppError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("{} '{}' not found", resource, id),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "A valid admin token is required".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::TooManyRequests { retry_after_secs } => {
                retry_after = Some(retry_after_secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too Many Requests",
                    format!("Rate limit exceeded, retry in {}s", retry_after_secs),
                )
            },
            AppError::Upstream(msg) => {
                error!(error = %msg, "Content backend failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Bad Gateway",
                    "The content backend failed to answer".to_string(),
                )
            },
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", msg)
            },
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    msg,
                )
            },
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message,
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<ContentError> for AppError {
    fn from(error: ContentError) -> Self {
        match error {
            ContentError::Timeout { .. } | ContentError::Unavailable { .. } => {
                AppError::Unavailable(error.to_string())
            },
            ContentError::InvalidConfig(msg) => AppError::Internal(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}
