//! # Bufete KV
//!
//! Key-value backends for the Bufete cache layer.
//!
//! This crate provides the small command surface the cache needs (GET, SET
//! with expiry, DEL, KEYS, INCR, FLUSHALL) behind an async trait, with two
//! implementations:
//!
//! - [`RestKvStore`] talks to a managed Redis-compatible service over its
//!   HTTP REST protocol (Upstash style)
//! - [`MemoryStore`] keeps everything in process, for development and tests
//!
//! ## Example
//!
//! ```ignore
//! use bufete_kv::{KvConfig, KvStore, RestKvStore};
//! use std::time::Duration;
//!
//! let config = KvConfig::builder()
//!     .url("https://eu1-bufete.upstash.io")
//!     .token(token)
//!     .build()?;
//!
//! let store = RestKvStore::new(config)?;
//! store.set("public-services", "[]", Some(Duration::from_secs(1800))).await?;
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

// Re-exports
pub use config::{KvConfig, KvConfigBuilder};
pub use error::KvError;
pub use memory::MemoryStore;
pub use rest::RestKvStore;
pub use store::{KvStore, expiry_secs};

// Re-export bufete_core for consumers
pub use bufete_core;
