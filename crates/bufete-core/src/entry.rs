//! Typed cache entries and their serialization boundary.
//!
//! The backend only ever sees opaque JSON strings. `CacheEntry` is the one
//! place where a typed value crosses into that representation and back.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;
use crate::types::ttl;

/// A value on its way into (or out of) the key-value backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    key: CacheKey,
    value: T,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Creates an entry for `key` expiring after `ttl`.
    pub fn new(key: impl Into<CacheKey>, value: T, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            ttl,
        }
    }

    /// Returns the entry key.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns the cached value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the time to live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the TTL in whole seconds, never less than one.
    pub fn ttl_secs(&self) -> u64 {
        ttl::expiry_secs(self.ttl)
    }

    /// Consumes the entry, returning the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Serialize> CacheEntry<T> {
    /// Serializes the value into the stored representation.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.value)
            .map_err(|e| CacheError::serialization(self.key.as_str(), e))
    }
}

impl<T: DeserializeOwned> CacheEntry<T> {
    /// Parses a stored payload back into a typed value.
    ///
    /// The returned entry carries a zero TTL: the backend owns expiry and
    /// does not report the remaining lifetime on reads.
    pub fn decode(key: impl Into<CacheKey>, raw: &str) -> Result<Self> {
        let key = key.into();
        match serde_json::from_str(raw) {
            Ok(value) => Ok(Self {
                key,
                value,
                ttl: Duration::ZERO,
            }),
            Err(e) => Err(CacheError::malformed(key.into_string(), e.to_string())),
        }
    }
}
