//! Error types for content sources.

/// Errors that can occur when reading site content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The HTTP transport failed.
    #[error("http error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("content backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply could not be decoded.
    #[error("failed to decode content response: {0}")]
    Decode(String),

    /// A timeout occurred while waiting for the backend.
    #[error("content request timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The source is not available.
    #[error("content source unavailable: {reason}")]
    Unavailable { reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ContentError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
