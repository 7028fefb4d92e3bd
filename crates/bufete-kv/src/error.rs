//! Error types for key-value backends.

use bufete_core::CacheError;

/// Errors that can occur when talking to a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The HTTP transport failed before a reply was received.
    #[error("http error: {0}")]
    Http(String),

    /// The backend answered with a non-success status and no error body.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend rejected the command.
    #[error("command {command} failed: {message}")]
    Command { command: String, message: String },

    /// The reply did not have the expected shape.
    #[error("unexpected response to {command}: {reason}")]
    UnexpectedResponse { command: String, reason: String },

    /// A timeout occurred while waiting for the backend.
    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// A key pattern could not be parsed.
    #[error("invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl KvError {
    /// Creates a new command error.
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new unexpected response error.
    pub fn unexpected(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Converts into the cache-layer error for the given operation.
    pub fn into_cache_error(self, operation: &str) -> CacheError {
        let message = self.to_string();
        CacheError::backend_with_cause(operation, message, self)
    }
}

impl From<KvError> for CacheError {
    fn from(error: KvError) -> Self {
        error.into_cache_error("kv")
    }
}
