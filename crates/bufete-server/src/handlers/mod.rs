//! HTTP handlers.

pub mod cache;
pub mod content;
pub mod health;
pub mod metrics;
pub mod response;

pub use response::ApiResponse;
