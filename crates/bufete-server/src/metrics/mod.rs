//! Metrics module for the Bufete server.

pub mod cache;
pub mod http;
pub mod setup;

pub use cache::{CacheMetrics, record_rate_limit_rejection};
pub use setup::init_metrics;
