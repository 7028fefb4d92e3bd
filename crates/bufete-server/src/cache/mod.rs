//! Cache module for the Bufete server.
//!
//! This module provides the read-through cache over the key-value backend,
//! pattern-based invalidation, the page revalidation trigger, and the
//! catalogue of cached site resources.

pub mod invalidation;
pub mod keys;
pub mod revalidate;
pub mod site_cache;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use invalidation::{ContentInvalidation, InvalidationResult};
pub use keys::ContentKind;
pub use revalidate::{HttpRevalidator, NoopRevalidator, PageRevalidator};
pub use site_cache::SiteCache;
