//! Page revalidation trigger.
//!
//! Rendered pages live in the frontend's own cache. After the data behind a
//! route changes, the frontend is told to regenerate that route on its next
//! request.

use std::time::Duration;

use async_trait::async_trait;
use bufete_core::{CacheError, RevalidateKind};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Marca rutas renderizadas como obsoletas.
#[async_trait]
pub trait PageRevalidator: Send + Sync {
    /// Revalida `path`. Con `RevalidateKind::Layout` se revalida tambien
    /// todo lo que cuelga de la ruta.
    async fn revalidate_path(&self, path: &str, kind: RevalidateKind) -> Result<(), CacheError>;

    /// Nombre del revalidador, para logs y health.
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct RevalidateRequest<'a> {
    path: &'a str,
    #[serde(rename = "type")]
    kind: RevalidateKind,
}

/// Revalidador que llama al webhook de revalidacion del frontend.
#[derive(Debug, Clone)]
pub struct HttpRevalidator {
    client: Client,
    url: String,
    secret: Option<String>,
}

impl HttpRevalidator {
    /// Crea un revalidador para el webhook en `url`.
    pub fn new(
        url: impl Into<String>,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bufete-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CacheError::internal(format!("revalidation client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            secret: secret.filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl PageRevalidator for HttpRevalidator {
    async fn revalidate_path(&self, path: &str, kind: RevalidateKind) -> Result<(), CacheError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&RevalidateRequest { path, kind });

        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CacheError::revalidation(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(path = %path, kind = %kind, status = status.as_u16(), "Revalidation webhook rejected request");
            return Err(CacheError::revalidation(
                path,
                format!("webhook returned status {}", status.as_u16()),
            ));
        }

        info!(path = %path, kind = %kind, "Page revalidated");
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Revalidador sin efecto, para cuando no hay webhook configurado.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRevalidator;

#[async_trait]
impl PageRevalidator for NoopRevalidator {
    async fn revalidate_path(&self, path: &str, kind: RevalidateKind) -> Result<(), CacheError> {
        debug!(path = %path, kind = %kind, "Revalidation skipped, no webhook configured");
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
