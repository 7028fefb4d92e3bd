//! Cache invalidation with pattern matching support.
//!
//! Todas las operaciones son best effort: los fallos se registran y se
//! reportan como un resultado vacio o `false`, nunca como error.

use bufete_core::{CacheError, RevalidateKind, prefix_for_path, prefix_pattern};
use bufete_kv::KvStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::keys::ContentKind;
use crate::cache::site_cache::SiteCache;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationResult {
    /// Número de keys eliminadas.
    pub count: usize,
    /// Keys o patrones aplicados.
    pub patterns: Vec<String>,
}

impl InvalidationResult {
    fn empty(pattern: impl Into<String>) -> Self {
        Self {
            count: 0,
            patterns: vec![pattern.into()],
        }
    }

    fn merge(&mut self, other: InvalidationResult) {
        self.count += other.count;
        self.patterns.extend(other.patterns);
    }
}

/// Resultado de invalidar un recurso del sitio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentInvalidation {
    /// Recurso invalidado.
    pub kind: String,
    /// Keys eliminadas.
    pub invalidation: InvalidationResult,
    /// Rutas revalidadas con exito.
    pub revalidated: Vec<String>,
    /// Rutas cuya revalidacion fallo.
    pub failed: Vec<String>,
}

impl SiteCache {
    /// Elimina una key exacta. No hace nada si la key no existe o la cache
    /// esta deshabilitada.
    pub async fn invalidate_cache(&self, key: &str) -> InvalidationResult {
        let Some(store) = self.store() else {
            return InvalidationResult::empty(key);
        };

        match store.del(&[key.to_string()]).await {
            Ok(deleted) => {
                self.metrics().record_invalidation("key", deleted);
                debug!(key = %key, deleted = deleted, "Cache key invalidated");
                InvalidationResult {
                    count: deleted as usize,
                    patterns: vec![key.to_string()],
                }
            },
            Err(e) => {
                self.metrics().record_error("DEL");
                warn!(key = %key, error = %e, "Failed to invalidate cache key");
                InvalidationResult::empty(key)
            },
        }
    }

    /// Elimina todas las keys `prefix:*`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use bufete_server::cache::SiteCache;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let cache = SiteCache::disabled();
    /// let result = cache.invalidate_cache_by_prefix("blog").await;
    /// println!("Invalidated {} entries", result.count);
    /// # }
    /// ```
    pub async fn invalidate_cache_by_prefix(&self, prefix: &str) -> InvalidationResult {
        self.invalidate_by_pattern(&prefix_pattern(prefix)).await
    }

    /// Invalida entradas usando un patrón glob.
    ///
    /// El backend no borra por patrón: primero se listan las keys que
    /// coinciden y luego se eliminan. Una key escrita entre ambos pasos
    /// sobrevive hasta su TTL.
    ///
    /// - `*`: coincide con cualquier secuencia de caracteres
    /// - `?`: coincide con un carácter
    pub async fn invalidate_by_pattern(&self, pattern: &str) -> InvalidationResult {
        let Some(store) = self.store() else {
            return InvalidationResult::empty(pattern);
        };

        match delete_matching(store.as_ref(), pattern).await {
            Ok(count) => {
                self.metrics().record_invalidation("pattern", count as u64);
                info!(pattern = %pattern, count = count, "Cache entries invalidated by pattern");
                InvalidationResult {
                    count,
                    patterns: vec![pattern.to_string()],
                }
            },
            Err(e) => {
                self.metrics().record_error("KEYS");
                warn!(pattern = %pattern, error = %e, "Failed to invalidate by pattern");
                InvalidationResult::empty(pattern)
            },
        }
    }

    /// Invalida múltiples patrones a la vez.
    pub async fn invalidate_by_patterns<S: AsRef<str>>(&self, patterns: &[S]) -> InvalidationResult {
        let mut total = InvalidationResult::default();
        for pattern in patterns {
            total.merge(self.invalidate_by_pattern(pattern.as_ref()).await);
        }
        total
    }

    /// Vacia el backend completo.
    ///
    /// Returns false if the cache is disabled or the flush fails.
    pub async fn invalidate_all_cache(&self) -> bool {
        let Some(store) = self.store() else {
            debug!("Flush requested with cache disabled");
            return false;
        };

        match store.flush_all().await {
            Ok(()) => {
                info!(backend = %store.name(), "All cache entries invalidated");
                true
            },
            Err(e) => {
                self.metrics().record_error("FLUSHALL");
                warn!(error = %e, "Failed to flush cache");
                false
            },
        }
    }

    /// Revalida la pagina en `path` y elimina las keys bajo su prefijo.
    ///
    /// Returns false if the revalidation fails; the keys are then left alone.
    pub async fn revalidate_and_clear_cache(&self, path: &str) -> bool {
        self.revalidate_and_clear_cache_as(path, RevalidateKind::Page)
            .await
    }

    /// Como [`SiteCache::revalidate_and_clear_cache`] con un tipo de
    /// revalidacion explicito.
    pub async fn revalidate_and_clear_cache_as(&self, path: &str, kind: RevalidateKind) -> bool {
        if let Err(e) = self.revalidator().revalidate_path(path, kind).await {
            warn!(path = %path, error = %e, "Revalidation failed, cache left untouched");
            return false;
        }

        let prefix = prefix_for_path(path);
        let result = self.invalidate_cache_by_prefix(&prefix).await;
        info!(path = %path, prefix = %prefix, count = result.count, "Page revalidated and cache cleared");
        true
    }

    /// Invalida todas las lecturas cacheadas de un recurso y revalida las
    /// rutas que lo muestran.
    ///
    /// Se eliminan la key base sin parametros y cada variante parametrizada
    /// (`base-*`).
    pub async fn invalidate_content(&self, kind: ContentKind) -> ContentInvalidation {
        let mut invalidation = InvalidationResult::default();

        for base in kind.cache_keys() {
            invalidation.merge(self.invalidate_cache(base).await);
            invalidation.merge(self.invalidate_by_pattern(&format!("{}-*", base)).await);
        }

        let mut revalidated = Vec::new();
        let mut failed = Vec::new();
        for (path, revalidate_kind) in kind.affected_paths() {
            match self.revalidator().revalidate_path(path, *revalidate_kind).await {
                Ok(()) => revalidated.push(path.to_string()),
                Err(e) => {
                    warn!(kind = %kind, path = %path, error = %e, "Revalidation failed");
                    failed.push(path.to_string());
                },
            }
        }

        info!(
            kind = %kind,
            count = invalidation.count,
            revalidated = revalidated.len(),
            failed = failed.len(),
            "Content cache invalidated"
        );

        ContentInvalidation {
            kind: kind.to_string(),
            invalidation,
            revalidated,
            failed,
        }
    }
}

async fn delete_matching(store: &dyn KvStore, pattern: &str) -> Result<usize, CacheError> {
    let keys = store
        .keys(pattern)
        .await
        .map_err(|e| e.into_cache_error("KEYS"))?;

    if keys.is_empty() {
        return Ok(0);
    }

    let deleted = store
        .del(&keys)
        .await
        .map_err(|e| e.into_cache_error("DEL"))?;

    Ok(deleted as usize)
}
