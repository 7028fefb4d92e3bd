//! Key-value backend configuration.

use std::fmt;
use std::time::Duration;

use crate::error::KvError;

/// Configuration for the REST key-value backend.
#[derive(Clone)]
pub struct KvConfig {
    /// Base URL of the REST endpoint.
    url: String,

    /// Bearer token sent with every command.
    token: String,

    /// Per-request timeout.
    timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_millis(2000)
}

impl KvConfig {
    /// Creates a new builder.
    pub fn builder() -> KvConfigBuilder {
        KvConfigBuilder::default()
    }

    /// Builds a configuration from optional environment values.
    ///
    /// Returns `Ok(None)` when either value is missing or blank: that is the
    /// pass-through mode, not an error. Present but invalid values are an
    /// error.
    pub fn from_parts(
        url: Option<String>,
        token: Option<String>,
    ) -> Result<Option<Self>, KvError> {
        let url = url.filter(|u| !u.trim().is_empty());
        let token = token.filter(|t| !t.trim().is_empty());

        match (url, token) {
            (Some(url), Some(token)) => Self::builder().url(url).token(token).build().map(Some),
            _ => Ok(None),
        }
    }

    /// Returns the endpoint URL (without trailing slash).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns a copy with a different timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for KvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for KvConfig.
#[derive(Debug, Default)]
pub struct KvConfigBuilder {
    url: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl KvConfigBuilder {
    /// Sets the endpoint URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is missing, or the URL is not
    /// an http(s) URL.
    pub fn build(self) -> Result<KvConfig, KvError> {
        let url = self
            .url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| KvError::InvalidConfig("url is required".to_string()))?;
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| KvError::InvalidConfig("token is required".to_string()))?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(KvError::InvalidConfig(format!(
                "url must start with http:// or https://, got '{}'",
                url
            )));
        }

        let timeout = self.timeout.unwrap_or_else(default_timeout);
        if timeout.is_zero() {
            return Err(KvError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(KvConfig {
            url,
            token,
            timeout,
        })
    }
}
