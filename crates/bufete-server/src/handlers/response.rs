//! Envelope JSON de las respuestas exitosas.

use serde::{Deserialize, Serialize};

/// `{"success": true, "data": ...}`.
///
/// Las lecturas publicas se cachean ya envueltas, asi un hit se sirve tal
/// cual sale del backend de cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
