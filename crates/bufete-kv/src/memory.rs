//! In-process key-value store.
//!
//! Useful for local development without a managed KV service and as the
//! backend of the cache tests. Expired entries are dropped lazily, on the
//! next access that touches them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use glob::Pattern;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::error::KvError;
use crate::store::{KvStore, expiry_secs};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Un store en memoria con la semántica de los comandos del backend REST.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de entradas vivas.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns true if no live entry remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining time to live of a key, if it exists and expires.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock();
        let entry = entries.get(key).filter(|entry| !entry.is_expired(now))?;
        entry
            .expires_at
            .map(|at| at.saturating_duration_since(now))
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                trace!(key = %key, "expired entry dropped");
                Ok(None)
            },
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let expires_at = ttl.map(|ttl| Instant::now() + Duration::from_secs(expiry_secs(ttl)));

        self.entries.lock().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let deleted = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired(now))
            .count();

        Ok(deleted as u64)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let matcher = Pattern::new(pattern).map_err(|e| KvError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();
        keys.sort();

        Ok(keys)
    }

    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert_with(|| StoredValue {
            value: "0".to_string(),
            expires_at: None,
        });

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| KvError::command("INCR", "ERR value is not an integer or out of range"))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| KvError::command("INCR", "ERR increment or decrement would overflow"))?;

        entry.value = next.to_string();
        Ok(next)
    }

    async fn flush_all(&self) -> Result<(), KvError> {
        self.entries.lock().clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
