//! Test helpers para bufete-server.

#![allow(dead_code, unused_imports)]

pub mod client;

use std::sync::Arc;

use async_trait::async_trait;
use bufete_core::{CacheError, RevalidateKind};
use bufete_kv::{KvStore, MemoryStore};
use bufete_server::cache::{PageRevalidator, SiteCache};
use bufete_server::cache::ContentKind;
use bufete_server::content::{ContentSource, StaticSource};
use bufete_server::metrics::setup::detached_handle;
use bufete_server::rate_limit::RATE_LIMIT_PREFIX;
use bufete_server::{AppState, RateLimitConfig, RateLimiter, create_router};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub use client::{TestClient, TestResponse};

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Revalidador que registra cada llamada.
#[derive(Debug, Default)]
pub struct MockRevalidator {
    calls: Mutex<Vec<(String, RevalidateKind)>>,
    fail: bool,
}

impl MockRevalidator {
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
impl PageRevalidator for MockRevalidator {
    async fn revalidate_path(&self, path: &str, kind: RevalidateKind) -> Result<(), CacheError> {
        self.calls.lock().push((path.to_string(), kind));
        if self.fail {
            return Err(CacheError::revalidation(path, "frontend unavailable"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Contenido de ejemplo del sitio.
pub fn sample_content() -> StaticSource {
    StaticSource::new()
        .with_rows(
            ContentKind::BlogPosts,
            vec![
                json!({"slug": "despido-improcedente", "title": "Despido improcedente", "category_slug": "laboral", "tags": ["despidos"], "published": true, "published_at": "2024-03-01"}),
                json!({"slug": "herencias", "title": "Herencias sin testamento", "category_slug": "civil", "tags": ["familia"], "published": true, "published_at": "2024-05-10"}),
                json!({"slug": "borrador", "title": "Borrador", "category_slug": "civil", "tags": [], "published": false, "published_at": "2024-06-01"}),
            ],
        )
        .with_rows(
            ContentKind::BlogCategories,
            vec![
                json!({"slug": "laboral", "name": "Laboral"}),
                json!({"slug": "civil", "name": "Civil"}),
            ],
        )
        .with_rows(
            ContentKind::BlogTags,
            vec![
                json!({"slug": "familia", "name": "Familia", "blog_post_tags": [{"count": 1}]}),
                json!({"slug": "despidos", "name": "Despidos", "blog_post_tags": [{"count": 4}]}),
            ],
        )
        .with_rows(
            ContentKind::Services,
            vec![
                json!({"slug": "laboral", "title": "Derecho laboral", "display_order": 2}),
                json!({"slug": "civil", "title": "Derecho civil", "display_order": 1}),
            ],
        )
        .with_rows(
            ContentKind::Settings,
            vec![json!({"site_name": "Bufete", "phone": "+34 600 000 000"})],
        )
}

/// Aplicacion montada sobre dobles en memoria.
pub struct TestApp {
    pub client: TestClient,
    pub store: Option<Arc<MemoryStore>>,
    pub content: Arc<StaticSource>,
    pub revalidator: Arc<MockRevalidator>,
}

/// Builder de [`TestApp`].
pub struct TestAppBuilder {
    cache_enabled: bool,
    admin_token: Option<String>,
    rate_limit: RateLimitConfig,
    content: StaticSource,
    revalidator: MockRevalidator,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            admin_token: Some(ADMIN_TOKEN.to_string()),
            rate_limit: RateLimitConfig::default(),
            content: sample_content(),
            revalidator: MockRevalidator::default(),
        }
    }
}

impl TestAppBuilder {
    pub fn pass_through(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    pub fn without_admin_token(mut self) -> Self {
        self.admin_token = None;
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    pub fn content(mut self, content: StaticSource) -> Self {
        self.content = content;
        self
    }

    pub fn failing_revalidator(mut self) -> Self {
        self.revalidator = MockRevalidator::failing();
        self
    }

    pub fn build(self) -> TestApp {
        let store = self.cache_enabled.then(|| Arc::new(MemoryStore::new()));
        let kv = store.clone().map(|s| s as Arc<dyn KvStore>);
        let content = Arc::new(self.content);
        let revalidator = Arc::new(self.revalidator);

        let cache = SiteCache::new(kv.clone(), revalidator.clone());
        let rate_limiter = RateLimiter::new(kv, self.rate_limit);
        let state = AppState::new(
            cache,
            content.clone() as Arc<dyn ContentSource>,
            rate_limiter,
            self.admin_token,
        );

        TestApp {
            client: TestClient::new(create_router(state, detached_handle())),
            store,
            content,
            revalidator,
        }
    }
}

pub fn builder() -> TestAppBuilder {
    TestAppBuilder::default()
}

/// Aplicacion con cache en memoria y token de administracion.
pub fn app() -> TestApp {
    builder().build()
}

/// Atajo para tests que solo necesitan el cliente.
pub fn client() -> TestClient {
    app().client
}

impl TestApp {
    pub fn store(&self) -> &MemoryStore {
        self.store.as_deref().expect("cache is disabled in this app")
    }

    /// Keys de contenido en el backend, sin los contadores del rate limit.
    pub async fn cache_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .store()
            .keys("*")
            .await
            .unwrap()
            .into_iter()
            .filter(|key| !key.starts_with(RATE_LIMIT_PREFIX))
            .collect();
        keys.sort();
        keys
    }

    pub async fn cached(&self, key: &str) -> Option<Value> {
        let raw = self.store().get(key).await.unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }
}
