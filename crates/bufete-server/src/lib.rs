//! Bufete Server - cache layer and HTTP API for the firm's public site.
//!
//! Public content (blog, services, settings) is read through a key-value
//! cache with per-resource TTLs. An admin API invalidates cached entries and
//! asks the frontend to revalidate the affected pages. When the key-value
//! backend is not configured every read goes straight to the content
//! backend.

pub mod cache;
pub mod content;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limit;
pub mod server;
pub mod settings;
pub mod state;

pub use cache::SiteCache;
pub use error::AppError;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use server::{create_router, run_server};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
