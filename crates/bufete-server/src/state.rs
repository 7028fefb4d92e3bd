//! Application state.

use std::sync::Arc;

use bufete_kv::{KvError, KvStore, MemoryStore, RestKvStore};
use tracing::{info, warn};

use crate::cache::{HttpRevalidator, NoopRevalidator, PageRevalidator, SiteCache};
use crate::content::{ContentSource, PostgrestSource, StaticSource};
use crate::rate_limit::RateLimiter;
use crate::settings::{CacheBackend, Settings};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-through cache over the key-value backend.
    cache: SiteCache,
    /// Source of site content.
    content: Arc<dyn ContentSource>,
    /// Rate limiter for the admin API.
    rate_limiter: RateLimiter,
    /// Token required by the admin API. `None` disables it.
    admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        cache: SiteCache,
        content: Arc<dyn ContentSource>,
        rate_limiter: RateLimiter,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            cache,
            content,
            rate_limiter,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Builds the state described by `settings`.
    ///
    /// The key-value store is created once here and shared by the cache and
    /// the rate limiter.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store = build_store(settings)?;

        let revalidator: Arc<dyn PageRevalidator> = match &settings.revalidate {
            Some(revalidate) => Arc::new(HttpRevalidator::new(
                revalidate.url.clone(),
                revalidate.secret.clone(),
                settings.request_timeout,
            )?),
            None => {
                warn!("No revalidation webhook configured, page revalidation is disabled");
                Arc::new(NoopRevalidator)
            },
        };

        let content: Arc<dyn ContentSource> = match &settings.content {
            Some(content) => Arc::new(PostgrestSource::new(
                content.url.clone(),
                content.key.clone(),
                settings.request_timeout,
            )?),
            None => {
                warn!("No content backend configured, serving empty content");
                Arc::new(StaticSource::new())
            },
        };

        let cache = SiteCache::new(store.clone(), revalidator);
        let rate_limiter = RateLimiter::new(store, settings.rate_limit);

        info!(
            cache_mode = settings.cache_mode(),
            content = %content.name(),
            revalidator = %cache.revalidator().name(),
            "Application state initialized"
        );

        Ok(Self::new(
            cache,
            content,
            rate_limiter,
            settings.admin_token.clone(),
        ))
    }

    /// Returns the site cache.
    pub fn cache(&self) -> &SiteCache {
        &self.cache
    }

    /// Returns a reference to the content source.
    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    /// Returns the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the admin token, if the admin API is enabled.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }
}

/// Creates the key-value store selected by `settings`.
///
/// Returns `Ok(None)` for the REST backend without credentials.
pub fn build_store(settings: &Settings) -> Result<Option<Arc<dyn KvStore>>, KvError> {
    let store: Arc<dyn KvStore> = match (settings.cache_backend, &settings.kv) {
        (CacheBackend::Memory, _) => Arc::new(MemoryStore::new()),
        (CacheBackend::Rest, Some(config)) => Arc::new(RestKvStore::new(config.clone())?),
        (CacheBackend::Rest, None) => {
            warn!("KV credentials missing, cache runs in pass-through mode");
            return Ok(None);
        },
    };

    Ok(Some(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        Settings::load_from(Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
        .unwrap()
    }

    #[test]
    fn test_pass_through_without_credentials() {
        let state = AppState::from_settings(&settings(&[])).unwrap();

        assert!(!state.cache().is_enabled());
        assert_eq!(state.content().name(), "static");
        assert_eq!(state.admin_token(), None);
    }

    #[test]
    fn test_memory_backend() {
        let state = AppState::from_settings(&settings(&[
            ("BUFETE_CACHE_BACKEND", "memory"),
            ("BUFETE_ADMIN_TOKEN", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(state.cache().backend_name(), Some("memory"));
        assert_eq!(state.admin_token(), Some("s3cret"));
    }

    #[test]
    fn test_rest_backend_with_credentials() {
        let store = build_store(&settings(&[
            ("BUFETE_KV_URL", "https://kv.example.com"),
            ("BUFETE_KV_TOKEN", "token"),
        ]))
        .unwrap();

        assert_eq!(store.map(|s| s.name().to_string()).as_deref(), Some("rest"));
    }
}
