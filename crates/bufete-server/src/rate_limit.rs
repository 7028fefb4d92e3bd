//! Fixed-window rate limiter over the key-value backend.
//!
//! Each client gets a counter `rate-limit:<client>` that lives for one
//! window. The first request of a window creates it, later ones read it and
//! increment it. Read and increment are separate commands, so two
//! concurrent requests can both pass the check; the limit is approximate.

use std::sync::Arc;
use std::time::Duration;

use bufete_core::RateLimitDecision;
use bufete_kv::{KvError, KvStore};
use tracing::{debug, warn};

/// Prefijo de las keys del rate limiter.
pub const RATE_LIMIT_PREFIX: &str = "rate-limit";

/// Limites del rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests permitidos por ventana.
    pub max_requests: u32,
    /// Duracion de la ventana.
    pub window: Duration,
    /// Identificar al cliente por `x-forwarded-for`/`x-real-ip`. Solo detras
    /// de un proxy que reescriba esos headers.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            trust_proxy_headers: false,
        }
    }
}

/// Rate limiter de ventana fija.
///
/// Sin backend configurado todos los requests pasan. Un fallo del backend
/// tambien deja pasar el request: el limiter protege endpoints de
/// administracion, no es un control de acceso.
#[derive(Clone)]
pub struct RateLimiter {
    store: Option<Arc<dyn KvStore>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Creates a rate limiter over `store`.
    pub fn new(store: Option<Arc<dyn KvStore>>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Rate limiter sin backend: permite todo.
    pub fn disabled(config: RateLimitConfig) -> Self {
        Self::new(None, config)
    }

    /// Returns the limits.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Key del contador de un cliente.
    pub fn key_for(client: &str) -> String {
        format!("{}:{}", RATE_LIMIT_PREFIX, client)
    }

    /// Cuenta un request de `client` y decide si puede continuar.
    pub async fn check(&self, client: &str) -> RateLimitDecision {
        let Some(store) = self.store.as_deref() else {
            return RateLimitDecision::allow(self.config.max_requests);
        };

        let key = Self::key_for(client);
        match self.count_request(store, &key).await {
            Ok(decision) => {
                debug!(
                    client = %client,
                    allowed = decision.allowed,
                    remaining = decision.remaining,
                    "Rate limit checked"
                );
                decision
            },
            Err(e) => {
                warn!(client = %client, error = %e, "Rate limit check failed, allowing request");
                RateLimitDecision::allow(self.config.max_requests)
            },
        }
    }

    async fn count_request(
        &self,
        store: &dyn KvStore,
        key: &str,
    ) -> Result<RateLimitDecision, KvError> {
        let max = self.config.max_requests;
        if max == 0 {
            return Ok(RateLimitDecision::reject());
        }

        let Some(raw) = store.get(key).await? else {
            store.set(key, "1", Some(self.config.window)).await?;
            return Ok(RateLimitDecision::allow(max - 1));
        };

        let current: u32 = raw
            .trim()
            .parse()
            .map_err(|_| KvError::unexpected("GET", format!("counter '{}' is not a number", raw)))?;
        if current >= max {
            return Ok(RateLimitDecision::reject());
        }

        let count = store.incr(key).await?;
        let count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
        Ok(RateLimitDecision::allow(max.saturating_sub(count)))
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("backend", &self.store.as_deref().map(|store| store.name()))
            .field("config", &self.config)
            .finish()
    }
}
