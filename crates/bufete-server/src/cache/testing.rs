//! Test doubles for the cache layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bufete_core::{CacheError, RevalidateKind};
use bufete_kv::{KvError, KvStore};
use parking_lot::Mutex;

use super::revalidate::PageRevalidator;

fn unreachable_backend() -> KvError {
    KvError::Http("connection refused".to_string())
}

/// Store whose every command fails at the transport level.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Err(unreachable_backend())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), KvError> {
        Err(unreachable_backend())
    }

    async fn del(&self, _keys: &[String]) -> Result<u64, KvError> {
        Err(unreachable_backend())
    }

    async fn keys(&self, _pattern: &str) -> Result<Vec<String>, KvError> {
        Err(unreachable_backend())
    }

    async fn incr(&self, _key: &str) -> Result<i64, KvError> {
        Err(unreachable_backend())
    }

    async fn flush_all(&self) -> Result<(), KvError> {
        Err(unreachable_backend())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Store that is always empty and rejects writes.
#[derive(Debug, Default)]
pub struct FlakyWriteStore {
    writes: AtomicUsize,
}

impl FlakyWriteStore {
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for FlakyWriteStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), KvError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(KvError::Timeout { millis: 2000 })
    }

    async fn del(&self, _keys: &[String]) -> Result<u64, KvError> {
        Ok(0)
    }

    async fn keys(&self, _pattern: &str) -> Result<Vec<String>, KvError> {
        Ok(Vec::new())
    }

    async fn incr(&self, _key: &str) -> Result<i64, KvError> {
        Ok(1)
    }

    async fn flush_all(&self) -> Result<(), KvError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky-write"
    }
}

/// Revalidator that records every call and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingRevalidator {
    calls: Mutex<Vec<(String, RevalidateKind)>>,
    fail: bool,
}

impl RecordingRevalidator {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(String, RevalidateKind)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl PageRevalidator for RecordingRevalidator {
    async fn revalidate_path(&self, path: &str, kind: RevalidateKind) -> Result<(), CacheError> {
        self.calls.lock().push((path.to_string(), kind));
        if self.fail {
            return Err(CacheError::revalidation(path, "webhook unavailable"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
