//! Read-through cache over the key-value backend.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bufete_core::{CacheEntry, CacheError, CacheKey};
use bufete_kv::KvStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::revalidate::{NoopRevalidator, PageRevalidator};
use crate::metrics::CacheMetrics;

/// Cache de lectura del sitio.
///
/// Sin backend configurado funciona en modo pass-through: cada lectura va
/// directa a la fuente y no se hace ninguna llamada de red al store. Los
/// fallos del backend nunca llegan al llamador, solo degradan a "sin cache".
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use bufete_core::{CacheParams, create_cache_key, ttl};
/// use bufete_kv::MemoryStore;
/// use bufete_server::cache::{NoopRevalidator, SiteCache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = SiteCache::new(Some(Arc::new(MemoryStore::new())), Arc::new(NoopRevalidator));
/// let key = create_cache_key("public-services", &CacheParams::new());
///
/// let services: Result<Vec<String>, std::io::Error> = cache
///     .get_cached_data(&key, || async { Ok(vec!["Derecho laboral".to_string()]) }, ttl::MEDIUM)
///     .await;
/// # }
/// ```
#[derive(Clone)]
pub struct SiteCache {
    store: Option<Arc<dyn KvStore>>,
    revalidator: Arc<dyn PageRevalidator>,
    metrics: CacheMetrics,
}

impl SiteCache {
    /// Crea una cache sobre `store`; `None` deja la cache en pass-through.
    pub fn new(store: Option<Arc<dyn KvStore>>, revalidator: Arc<dyn PageRevalidator>) -> Self {
        Self {
            store,
            revalidator,
            metrics: CacheMetrics::new(),
        }
    }

    /// Cache sin backend ni webhook de revalidacion.
    pub fn disabled() -> Self {
        Self::new(None, Arc::new(NoopRevalidator))
    }

    /// Returns true if a backend is configured.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Nombre del backend, si lo hay.
    pub fn backend_name(&self) -> Option<&str> {
        self.store.as_deref().map(|store| store.name())
    }

    /// Returns the backend store.
    pub fn store(&self) -> Option<&Arc<dyn KvStore>> {
        self.store.as_ref()
    }

    /// Returns the page revalidator.
    pub fn revalidator(&self) -> &dyn PageRevalidator {
        self.revalidator.as_ref()
    }

    /// Returns the cache metrics.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Lee `key` del backend o, si no esta, la obtiene con `fetch` y la guarda
    /// con el TTL dado.
    ///
    /// - Hit: se devuelve el valor guardado y `fetch` no se invoca.
    /// - Miss: se invoca `fetch`, se espera la escritura y se devuelve el
    ///   valor aunque la escritura falle.
    /// - Valor corrupto: se borra la key y se trata como miss.
    /// - Error del backend al leer: se invoca `fetch` sin escribir.
    ///
    /// Los errores de `fetch` se propagan sin tocar.
    pub async fn get_cached_data<T, F, Fut, E>(
        &self,
        key: &CacheKey,
        fetch: F,
        ttl: Duration,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(store) = self.store.as_deref() else {
            return fetch().await;
        };

        let start = Instant::now();
        match read::<T>(store, key).await {
            Ok(Some(value)) => {
                self.metrics.record_hit();
                self.metrics
                    .record_operation_duration("hit", start.elapsed());
                debug!(key = %key, "Cache hit");
                return Ok(value);
            },
            Ok(None) => {
                self.metrics.record_miss();
                debug!(key = %key, "Cache miss");
            },
            Err(e) if e.is_malformed() => {
                self.metrics.record_miss();
                self.metrics.record_error("decode");
                warn!(key = %key, error = %e, "Discarding malformed cached value");
                if let Err(e) = store.del(&[key.to_string()]).await {
                    warn!(key = %key, error = %e, "Failed to delete malformed cached value");
                }
            },
            Err(e) => {
                self.metrics.record_error("GET");
                warn!(key = %key, error = %e, "Cache read failed, fetching uncached");
                return fetch().await;
            },
        }

        let value = fetch().await?;

        if let Err(e) = write(store, &CacheEntry::new(key, &value, ttl)).await {
            self.metrics.record_error("SET");
            warn!(key = %key, error = %e, "Failed to store fetched value");
        }
        self.metrics
            .record_operation_duration("miss", start.elapsed());

        Ok(value)
    }

    /// Guarda un valor sin pasar por una fuente.
    ///
    /// Returns false when the cache is disabled or the write fails.
    pub async fn set_cache<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> bool {
        let Some(store) = self.store.as_deref() else {
            return false;
        };

        match write(store, &CacheEntry::new(key, value, ttl)).await {
            Ok(()) => true,
            Err(e) => {
                self.metrics.record_error("SET");
                warn!(key = %key, error = %e, "Failed to store value");
                false
            },
        }
    }

    /// Lee un valor sin invocar ninguna fuente. Errores y valores corruptos
    /// se reportan como ausentes.
    pub async fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let store = self.store.as_deref()?;

        match read::<T>(store, key).await {
            Ok(value) => value,
            Err(e) => {
                debug!(key = %key, error = %e, "Cache peek failed");
                None
            },
        }
    }
}

async fn read<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &CacheKey,
) -> Result<Option<T>, CacheError> {
    let raw = store
        .get(key.as_str())
        .await
        .map_err(|e| e.into_cache_error("GET"))?;

    match raw {
        Some(raw) => CacheEntry::<T>::decode(key, &raw).map(|entry| Some(entry.into_value())),
        None => Ok(None),
    }
}

async fn write<T: Serialize>(store: &dyn KvStore, entry: &CacheEntry<T>) -> Result<(), CacheError> {
    let payload = entry.encode()?;

    store
        .set(entry.key().as_str(), &payload, Some(entry.ttl()))
        .await
        .map_err(|e| e.into_cache_error("SET"))
}

impl std::fmt::Debug for SiteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCache")
            .field("backend", &self.backend_name())
            .field("revalidator", &self.revalidator.name())
            .finish()
    }
}
