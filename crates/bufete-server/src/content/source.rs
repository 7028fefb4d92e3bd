//! Content source trait definition.

use async_trait::async_trait;
use serde_json::Value;

use super::{ContentError, ContentPage, ContentQuery};
use crate::cache::ContentKind;

/// A source of site content.
///
/// # Implementors
///
/// - `PostgrestSource` - Reads the hosted relational backend over its REST API
/// - `StaticSource` - Serves fixed rows from memory (local development, tests)
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Runs a read query.
    ///
    /// # Errors
    ///
    /// - `ContentError::Status` if the backend rejects the query
    /// - `ContentError::Http` / `ContentError::Timeout` if it is unreachable
    async fn list(&self, query: &ContentQuery) -> Result<ContentPage, ContentError>;

    /// Returns the row of `kind` whose `slug` column equals `slug`, if any.
    async fn find_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> Result<Option<Value>, ContentError> {
        let query = ContentQuery::new(kind).filter("slug", slug).limit(1);
        Ok(self.list(&query).await?.items.into_iter().next())
    }

    /// Verifies that the source is reachable.
    async fn health_check(&self) -> Result<(), ContentError>;

    /// Returns the name of this source, for logging and health output.
    fn name(&self) -> &str;
}
