//! Content data access.
//!
//! The site's durable content (blog, services, settings) lives in a hosted
//! relational backend. This module keeps that backend behind the
//! [`ContentSource`] trait so the cache and the handlers never depend on its
//! wire format.

mod error;
mod memory;
mod postgrest;
mod query;
mod source;

pub use error::ContentError;
pub use memory::StaticSource;
pub use postgrest::PostgrestSource;
pub use query::{ContentPage, ContentQuery, DEFAULT_PER_PAGE, MAX_PER_PAGE, aggregate_tag_counts};
pub use source::ContentSource;
