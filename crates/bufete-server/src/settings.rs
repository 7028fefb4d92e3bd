//! Server settings loaded from the environment.
//!
//! Every option is read from a `BUFETE_`-prefixed variable (`BUFETE_PORT`,
//! `BUFETE_KV_URL`, ...). Missing key-value credentials are not an error:
//! the cache then runs in pass-through mode.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use bufete_kv::KvConfig;
use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::rate_limit::RateLimitConfig;

const ENV_PREFIX: &str = "BUFETE";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Backend de la cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheBackend {
    /// Servicio KV gestionado, via REST.
    #[default]
    Rest,
    /// Store en memoria del proceso.
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'rest' or 'memory', got '{}'", other)),
        }
    }
}

/// Webhook de revalidacion del frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidateSettings {
    pub url: String,
    pub secret: Option<String>,
}

/// Acceso al backend de contenido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    pub url: String,
    pub key: String,
}

/// Settings validados del servidor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cache_backend: CacheBackend,
    /// `None` deja la cache REST en pass-through.
    pub kv: Option<KvConfig>,
    pub request_timeout: Duration,
    pub revalidate: Option<RevalidateSettings>,
    pub content: Option<ContentSettings>,
    pub admin_token: Option<String>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSettings {
    host: String,
    port: u16,
    cache_backend: String,
    kv_url: Option<String>,
    kv_token: Option<String>,
    kv_timeout_ms: u64,
    revalidate_url: Option<String>,
    revalidate_secret: Option<String>,
    content_url: Option<String>,
    content_key: Option<String>,
    admin_token: Option<String>,
    rate_limit_max: u32,
    rate_limit_window_secs: u64,
    trust_proxy_headers: bool,
}

impl Default for RawSettings {
    fn default() -> Self {
        let rate_limit = RateLimitConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            cache_backend: "rest".to_string(),
            kv_url: None,
            kv_token: None,
            kv_timeout_ms: 2000,
            revalidate_url: None,
            revalidate_secret: None,
            content_url: None,
            content_key: None,
            admin_token: None,
            rate_limit_max: rate_limit.max_requests,
            rate_limit_window_secs: rate_limit.window.as_secs(),
            trust_proxy_headers: rate_limit.trust_proxy_headers,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load() -> Result<Self, LoadError> {
        Self::load_from(None)
    }

    /// Loads settings from `env` instead of the process environment.
    ///
    /// Keys are full variable names (`BUFETE_PORT`).
    pub fn load_from(env: Option<config::Map<String, String>>) -> Result<Self, LoadError> {
        let raw: RawSettings = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let cache_backend = raw
            .cache_backend
            .parse::<CacheBackend>()
            .map_err(|e| LoadError::invalid("cache_backend", e))?;

        if raw.kv_timeout_ms == 0 {
            return Err(LoadError::invalid("kv_timeout_ms", "must be greater than zero"));
        }
        let request_timeout = Duration::from_millis(raw.kv_timeout_ms);

        let kv = KvConfig::from_parts(raw.kv_url, raw.kv_token)
            .map_err(|e| LoadError::invalid("kv_url", e.to_string()))?
            .map(|config| config.with_timeout(request_timeout));

        if raw.rate_limit_max == 0 {
            return Err(LoadError::invalid("rate_limit_max", "must be at least 1"));
        }
        if raw.rate_limit_window_secs == 0 {
            return Err(LoadError::invalid(
                "rate_limit_window_secs",
                "must be at least 1",
            ));
        }

        let revalidate = non_blank(raw.revalidate_url).map(|url| RevalidateSettings {
            url,
            secret: non_blank(raw.revalidate_secret),
        });

        let content = match (non_blank(raw.content_url), non_blank(raw.content_key)) {
            (Some(url), Some(key)) => Some(ContentSettings { url, key }),
            (None, None) => None,
            _ => {
                return Err(LoadError::invalid(
                    "content_url",
                    "content_url and content_key must be set together",
                ));
            },
        };

        Ok(Self {
            host: raw.host,
            port: raw.port,
            cache_backend,
            kv,
            request_timeout,
            revalidate,
            content,
            admin_token: non_blank(raw.admin_token),
            rate_limit: RateLimitConfig {
                max_requests: raw.rate_limit_max,
                window: Duration::from_secs(raw.rate_limit_window_secs),
                trust_proxy_headers: raw.trust_proxy_headers,
            },
        })
    }

    /// Direccion en la que escucha el servidor.
    pub fn bind_addr(&self) -> Result<SocketAddr, LoadError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| LoadError::invalid("host", e.to_string()))
    }

    /// Describe el modo de cache para logs y health.
    pub fn cache_mode(&self) -> &'static str {
        match (self.cache_backend, &self.kv) {
            (CacheBackend::Memory, _) => "memory",
            (CacheBackend::Rest, Some(_)) => "rest",
            (CacheBackend::Rest, None) => "pass-through",
        }
    }
}
