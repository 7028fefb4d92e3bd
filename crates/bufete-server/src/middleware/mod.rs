//! Middleware stack para el servidor HTTP.
//!
//! - `RequestIdLayer`: genera/propaga X-Request-Id
//! - `LoggingLayer`: logging estructurado de requests
//! - `rate_limit` y `require_admin_token`: protegen la API de administracion

mod admin_auth;
mod logging;
mod rate_limit;
mod request_id;

pub use admin_auth::require_admin_token;
pub use logging::{LoggingLayer, LoggingMiddleware};
pub use rate_limit::{RATE_LIMIT_REMAINING_HEADER, client_id, enforce_rate_limit};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
