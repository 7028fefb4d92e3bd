//! In-memory content source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::{ContentError, ContentPage, ContentQuery, ContentSource};
use crate::cache::ContentKind;

/// Fuente de contenido con filas fijas en memoria.
///
/// Aplica filtros de igualdad y de pertenencia a arrays, busqueda por subcadena, orden y paginacion
/// sobre las filas, y cuenta las consultas recibidas.
#[derive(Debug, Default)]
pub struct StaticSource {
    rows: HashMap<ContentKind, Vec<Value>>,
    queries: AtomicUsize,
}

impl StaticSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `rows` served for `kind`.
    pub fn with_rows(mut self, kind: ContentKind, rows: Vec<Value>) -> Self {
        self.rows.insert(kind, rows);
        self
    }

    /// Numero de consultas recibidas.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

fn field_as_string(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, query: &ContentQuery) -> bool {
    let filters_match = query
        .filters()
        .iter()
        .all(|(column, value)| field_as_string(row, column).as_deref() == Some(value.as_str()));

    let contains_match = query.contains_filters().iter().all(|(column, value)| {
        row.get(column)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(value.as_str())))
    });

    let search_matches = match query.search_term() {
        Some((column, term)) => field_as_string(row, column)
            .is_some_and(|field| field.to_lowercase().contains(&term.to_lowercase())),
        None => true,
    };

    filters_match && contains_match && search_matches
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn list(&self, query: &ContentQuery) -> Result<ContentPage, ContentError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut items: Vec<Value> = self
            .rows
            .get(&query.kind())
            .map(|rows| rows.iter().filter(|row| matches(row, query)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, ascending)) = query.order() {
            items.sort_by(|a, b| {
                let ordering = field_as_string(a, column).cmp(&field_as_string(b, column));
                if ascending { ordering } else { ordering.reverse() }
            });
        }

        if let Some(limit) = query.row_limit() {
            items.truncate(limit as usize);
        }

        let Some((from, _)) = query.range() else {
            return Ok(ContentPage::single(items));
        };

        let (page, per_page) = query.page().unwrap_or((1, 0));
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(from as usize)
            .take(per_page as usize)
            .collect();

        Ok(ContentPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn health_check(&self) -> Result<(), ContentError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}
