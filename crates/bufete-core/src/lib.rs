//! Bufete Core - Cache domain types
//!
//! This crate provides the foundational, I/O-free pieces of the Bufete cache
//! layer: deterministic key construction, the typed entry codec that marks
//! the serialization boundary, TTL presets and the error taxonomy shared by
//! the backend client and the server.

pub mod entry;
pub mod error;
pub mod key;
pub mod types;

pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use key::{CacheKey, CacheParams, create_cache_key, prefix_for_path, prefix_pattern};
pub use types::{RateLimitDecision, RevalidateKind, ttl};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
