//! Content source backed by the hosted relational backend's REST API.
//!
//! Each table is exposed at `{base}/rest/v1/{table}`. Filters travel as
//! query parameters (`slug=eq.foo`, `title=ilike.*term*`), pagination as a
//! `Range` header, and the total row count comes back in `Content-Range`
//! when `Prefer: count=exact` is sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, HeaderMap};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ContentError, ContentPage, ContentQuery, ContentSource};

/// Fuente de contenido sobre la API REST del backend relacional.
#[derive(Debug, Clone)]
pub struct PostgrestSource {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl PostgrestSource {
    /// Creates a source for the project at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ContentError::InvalidConfig(format!(
                "content url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ContentError::InvalidConfig(
                "content api key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bufete-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContentError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            timeout,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn transport_error(&self, error: reqwest::Error) -> ContentError {
        if error.is_timeout() {
            ContentError::Timeout {
                millis: self.timeout.as_millis() as u64,
            }
        } else {
            ContentError::Http(error.to_string())
        }
    }
}

/// Parametros de query en el dialecto del backend.
fn query_params(query: &ContentQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.select_columns().to_string())];

    for (column, value) in query.filters() {
        params.push((column.clone(), format!("eq.{}", value)));
    }
    for (column, value) in query.contains_filters() {
        params.push((column.clone(), format!("cs.{{{}}}", value)));
    }
    if let Some((column, term)) = query.search_term() {
        params.push((column.to_string(), format!("ilike.*{}*", term)));
    }
    if let Some((column, ascending)) = query.order() {
        let direction = if ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", column, direction)));
    }
    if let Some(limit) = query.row_limit() {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// Extrae el total de un `Content-Range` (`0-9/42`, `*/0`).
fn parse_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit_once('/')?
        .1
        .parse()
        .ok()
}

#[async_trait]
impl ContentSource for PostgrestSource {
    async fn list(&self, query: &ContentQuery) -> Result<ContentPage, ContentError> {
        let table = query.kind().table();
        let mut request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query_params(query));

        if let Some((from, to)) = query.range() {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", from, to))
                .header("Prefer", "count=exact");
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let total = parse_total(response.headers());

        let (page, per_page) = query.page().unwrap_or((1, 0));

        // Pedir una pagina mas alla del final no es un error
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            debug!(table = %table, page = page, "Requested page is past the end");
            return Ok(ContentPage {
                items: Vec::new(),
                total: total.unwrap_or(0),
                page,
                per_page,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(table = %table, status = status.as_u16(), "Content query failed");
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<Value> = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;

        debug!(table = %table, rows = items.len(), "Content query succeeded");

        match query.page() {
            Some(_) => Ok(ContentPage {
                total: total.unwrap_or(items.len() as u64),
                items,
                page,
                per_page,
            }),
            None => Ok(ContentPage::single(items)),
        }
    }

    async fn health_check(&self) -> Result<(), ContentError> {
        let response = self
            .authorized(self.client.get(format!("{}/rest/v1/", self.base_url)))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_server_error() {
            return Err(ContentError::unavailable(format!(
                "health check returned status {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "postgrest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ContentKind;
    use httpmock::MockServer;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn source(server: &MockServer) -> PostgrestSource {
        PostgrestSource::new(server.base_url(), "anon-key", Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(PostgrestSource::new("ftp://db", "k", Duration::from_secs(1)).is_err());
        assert!(PostgrestSource::new("https://db.example.com", " ", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_query_params() {
        let query = ContentQuery::new(ContentKind::BlogPosts)
            .filter("published", "true")
            .contains("tags", "laboral")
            .search("title", "despido")
            .order_by("published_at", false);

        let params = query_params(&query);

        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("published".to_string(), "eq.true".to_string()),
                ("tags".to_string(), "cs.{laboral}".to_string()),
                ("title".to_string(), "ilike.*despido*".to_string()),
                ("order".to_string(), "published_at.desc".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_paginated_list_reads_total() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/rest/v1/blog_posts")
                    .query_param("published", "eq.true")
                    .header("apikey", "anon-key")
                    .header("range", "10-19")
                    .header("prefer", "count=exact");
                then.status(206)
                    .header("content-range", "10-11/12")
                    .json_body(json!([{"slug": "a"}, {"slug": "b"}]));
            })
            .await;

        let query = ContentQuery::new(ContentKind::BlogPosts)
            .filter("published", "true")
            .paginate(2, 10);
        let page = source(&server).list(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/rest/v1/blog_posts");
                then.status(416).header("content-range", "*/12");
            })
            .await;

        let query = ContentQuery::new(ContentKind::BlogPosts).paginate(9, 10);
        let page = source(&server).list(&query).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 12);
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/rest/v1/blog_posts")
                    .query_param("slug", "eq.herencias")
                    .query_param("limit", "1");
                then.status(200).json_body(json!([{"slug": "herencias"}]));
            })
            .await;

        let post = source(&server)
            .find_by_slug(ContentKind::BlogPosts, "herencias")
            .await
            .unwrap();

        assert_eq!(post, Some(json!({"slug": "herencias"})));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/rest/v1/services");
                then.status(500).body("boom");
            })
            .await;

        let error = source(&server)
            .list(&ContentQuery::new(ContentKind::Services))
            .await
            .unwrap_err();

        assert!(matches!(error, ContentError::Status { status: 500, .. }));
    }

    #[test]
    fn test_parse_total() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_total(&headers), None);

        headers.insert(CONTENT_RANGE, HeaderValue::from_static("0-9/42"));
        assert_eq!(parse_total(&headers), Some(42));

        headers.insert(CONTENT_RANGE, HeaderValue::from_static("0-9/*"));
        assert_eq!(parse_total(&headers), None);
    }
}
