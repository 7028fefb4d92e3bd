//! Key-value store trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::KvError;

pub use bufete_core::ttl::expiry_secs;

/// A network-accessed (or in-process) key-value store.
///
/// This trait mirrors the handful of commands the cache layer needs from a
/// managed Redis-compatible service. Values are opaque strings: encoding
/// and decoding happen above this layer.
///
/// # Implementors
///
/// - `RestKvStore` - Upstash-compatible HTTP REST backend
/// - `MemoryStore` - In-process store for local development and tests
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a value. A missing or expired key yields `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Writes a value, replacing any previous one.
    ///
    /// With `ttl`, the key expires after that long (rounded up to whole
    /// seconds, never below one).
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError>;

    /// Deletes keys, returning how many existed.
    async fn del(&self, keys: &[String]) -> Result<u64, KvError>;

    /// Lists keys matching a glob pattern (`*`, `?`, `[...]`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvError>;

    /// Increments an integer counter, creating it at 1 when absent.
    ///
    /// The key's expiry, if any, is left untouched.
    async fn incr(&self, key: &str) -> Result<i64, KvError>;

    /// Removes every key in the store.
    async fn flush_all(&self) -> Result<(), KvError>;

    /// Verifies that the store is reachable.
    ///
    /// The default implementation is a no-op for stores that are always
    /// available.
    async fn ping(&self) -> Result<(), KvError> {
        Ok(())
    }

    /// Returns the name of this store, for logging and health output.
    fn name(&self) -> &str;
}
