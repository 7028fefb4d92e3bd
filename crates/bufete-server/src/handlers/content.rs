//! Public content endpoints.
//!
//! Every read goes through the site cache with the TTL of its resource. The
//! cached value is the full response envelope.

use std::future::Future;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use bufete_core::{CacheKey, CacheParams, create_cache_key};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::instrument;

use super::response::ApiResponse;
use crate::cache::ContentKind;
use crate::cache::keys::{
    BLOG_CATEGORIES_KEY, BLOG_POST_KEY, BLOG_POSTS_KEY, BLOG_TAGS_KEY, SERVICES_KEY, SETTINGS_KEY,
};
use crate::content::{
    ContentPage, ContentQuery, DEFAULT_PER_PAGE, MAX_PER_PAGE, aggregate_tag_counts,
};
use crate::error::AppError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Query string de GET /api/blog/posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl PostsParams {
    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Solo los parametros recibidos forman parte de la key: el listado sin
    /// filtros queda en la key base. La paginacion se acota igual que en
    /// `ContentQuery::paginate`.
    pub fn cache_params(&self) -> CacheParams {
        CacheParams::new()
            .with_opt("page", self.page.map(|page| page.max(1)))
            .with_opt(
                "per_page",
                self.per_page.map(|per_page| per_page.clamp(1, MAX_PER_PAGE)),
            )
            .with_opt("category", self.category.as_deref())
            .with_opt("tag", self.tag.as_deref())
            .with_opt("search", self.search_term())
    }

    pub fn query(&self) -> ContentQuery {
        let mut query = ContentQuery::new(ContentKind::BlogPosts)
            .filter("published", "true")
            .order_by("published_at", false);

        if let Some(category) = &self.category {
            query = query.filter("category_slug", category.as_str());
        }
        if let Some(tag) = &self.tag {
            query = query.contains("tags", tag.as_str());
        }
        if let Some(term) = self.search_term() {
            query = query.search("title", term);
        }
        if self.page.is_some() || self.per_page.is_some() {
            query = query.paginate(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            );
        }
        query
    }
}

/// Lee `key` de la cache o la obtiene con `fetch`, y la envuelve.
async fn cached<T, F, Fut>(
    state: &AppState,
    key: CacheKey,
    kind: ContentKind,
    fetch: F,
) -> ApiResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let response = state
        .cache()
        .get_cached_data(
            &key,
            move || async move { Ok::<_, AppError>(ApiResponse::ok(fetch().await?)) },
            kind.ttl(),
        )
        .await?;

    Ok(Json(response))
}

/// GET /api/blog/posts
#[instrument(skip_all)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> ApiResult<ContentPage> {
    let key = create_cache_key(BLOG_POSTS_KEY, &params.cache_params());
    let content = state.content();
    let query = params.query();

    cached(&state, key, ContentKind::BlogPosts, move || async move {
        Ok::<_, AppError>(content.list(&query).await?)
    })
    .await
}

/// GET /api/blog/posts/{slug}
///
/// Los borradores responden 404 igual que un slug inexistente.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Value> {
    let key = create_cache_key(BLOG_POST_KEY, &CacheParams::new().with("slug", slug.as_str()));
    let content = state.content();
    let slug_ref = slug.as_str();

    cached(&state, key, ContentKind::BlogPosts, move || async move {
        let post = content
            .find_by_slug(ContentKind::BlogPosts, slug_ref)
            .await?
            .filter(|post| post.get("published").and_then(Value::as_bool).unwrap_or(true));

        post.ok_or_else(|| AppError::NotFound {
            resource: "post".to_string(),
            id: slug_ref.to_string(),
        })
    })
    .await
}

/// GET /api/blog/categories
#[instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let key = create_cache_key(BLOG_CATEGORIES_KEY, &CacheParams::new());
    let content = state.content();
    let query = ContentQuery::new(ContentKind::BlogCategories).order_by("name", true);

    cached(&state, key, ContentKind::BlogCategories, move || async move {
        Ok::<_, AppError>(content.list(&query).await?.items)
    })
    .await
}

/// GET /api/blog/tags
///
/// Tags con su numero de posts, los mas usados primero.
#[instrument(skip_all)]
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let key = create_cache_key(BLOG_TAGS_KEY, &CacheParams::new());
    let content = state.content();
    let query = ContentQuery::new(ContentKind::BlogTags).select("*,blog_post_tags(count)");

    cached(&state, key, ContentKind::BlogTags, move || async move {
        let rows = content.list(&query).await?.items;
        Ok::<_, AppError>(aggregate_tag_counts(rows))
    })
    .await
}

/// GET /api/services
#[instrument(skip_all)]
pub async fn list_services(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let key = create_cache_key(SERVICES_KEY, &CacheParams::new());
    let content = state.content();
    let query = ContentQuery::new(ContentKind::Services).order_by("display_order", true);

    cached(&state, key, ContentKind::Services, move || async move {
        Ok::<_, AppError>(content.list(&query).await?.items)
    })
    .await
}

/// GET /api/settings
#[instrument(skip_all)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Value> {
    let key = create_cache_key(SETTINGS_KEY, &CacheParams::new());
    let content = state.content();
    let query = ContentQuery::new(ContentKind::Settings).limit(1);

    cached(&state, key, ContentKind::Settings, move || async move {
        content
            .list(&query)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound {
                resource: "settings".to_string(),
                id: "site".to_string(),
            })
    })
    .await
}
