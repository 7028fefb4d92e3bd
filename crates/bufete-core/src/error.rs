//! Error types for the Bufete cache layer.
//!
//! This module defines the error taxonomy used by the cache, the
//! invalidation layer and the rate limiter. All errors implement the
//! standard `std::error::Error` trait via `thiserror`.
//!
//! # Error Handling Philosophy
//!
//! Cache failures are infrastructure failures, never domain failures:
//! - Internal helpers return `Result<T, CacheError>`
//! - The public cache API turns every `CacheError` into a degraded but
//!   successful outcome (an uncached fetch, a `false`, a log line)
//! - Errors produced by the caller's own fetch function are never wrapped
//!   in `CacheError`; they travel back to the caller untouched
//!
//! # Example
//!
//! ```
//! use bufete_core::{CacheError, Result};
//!
//! fn read_counter(raw: &str) -> Result<u32> {
//!     raw.parse()
//!         .map_err(|_| CacheError::malformed("rate-limit:10.0.0.1", "counter is not a number"))
//! }
//!
//! assert!(read_counter("3").is_ok());
//! assert!(read_counter("three").unwrap_err().is_malformed());
//! ```

use thiserror::Error;

/// Main error type for cache operations.
///
/// Each variant carries enough context to produce a useful log line at
/// the point where the error is swallowed.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key-value backend failed (network, timeout, error reply).
    #[error("Backend error during '{operation}': {message}")]
    Backend {
        /// Backend operation that failed (GET, SET, DEL, ...)
        operation: String,
        /// Description of the failure
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored payload could not be decoded.
    #[error("Malformed cached value under key '{key}': {message}")]
    Malformed {
        /// Key holding the bad payload
        key: String,
        /// Description of the decoding failure
        message: String,
    },

    /// A value could not be serialized for storage.
    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialization {
        /// Key the value was meant for
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The page revalidation trigger failed.
    #[error("Failed to revalidate '{path}': {message}")]
    Revalidation {
        /// Route that was being revalidated
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a Backend error without a cause.
    ///
    /// # Example
    ///
    /// ```
    /// use bufete_core::CacheError;
    ///
    /// let error = CacheError::backend("GET", "connection reset");
    /// assert_eq!(error.to_string(), "Backend error during 'GET': connection reset");
    /// ```
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Backend error with a cause.
    pub fn backend_with_cause<E>(
        operation: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a Malformed error.
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a Serialization error.
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }

    /// Creates a Revalidation error.
    pub fn revalidation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Revalidation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if the stored payload was unreadable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Type alias for Results with CacheError.
pub type Result<T> = std::result::Result<T, CacheError>;
