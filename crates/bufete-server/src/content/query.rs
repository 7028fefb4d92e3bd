//! Content query types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::ContentKind;

/// Tamaño de pagina por defecto.
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Tamaño de pagina maximo aceptado.
pub const MAX_PER_PAGE: u32 = 50;

/// Una lectura sobre una tabla de contenido.
///
/// # Example
///
/// ```
/// use bufete_server::cache::ContentKind;
/// use bufete_server::content::ContentQuery;
///
/// let query = ContentQuery::new(ContentKind::BlogPosts)
///     .filter("published", "true")
///     .search("title", "despido")
///     .paginate(2, 10);
///
/// assert_eq!(query.range(), Some((10, 19)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    kind: ContentKind,
    select: Option<String>,
    filters: Vec<(String, String)>,
    contains: Vec<(String, String)>,
    search: Option<(String, String)>,
    order: Option<(String, bool)>,
    page: Option<(u32, u32)>,
    limit: Option<u32>,
}

impl ContentQuery {
    /// Creates a query over the table of `kind`.
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            select: None,
            filters: Vec::new(),
            contains: Vec::new(),
            search: None,
            order: None,
            page: None,
            limit: None,
        }
    }

    /// Columnas a devolver (sintaxis `select` del backend, con embebidos).
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Filtro de igualdad.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// La columna (un array) contiene `value`.
    pub fn contains(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.contains.push((column.into(), value.into()));
        self
    }

    /// Busqueda por subcadena, sin distinguir mayusculas. Un termino vacio
    /// se ignora.
    pub fn search(mut self, column: impl Into<String>, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        if !term.is_empty() {
            self.search = Some((column.into(), term.to_string()));
        }
        self
    }

    /// Orden del resultado.
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }

    /// Paginacion 1-based. Valores fuera de rango se ajustan.
    pub fn paginate(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some((page.max(1), per_page.clamp(1, MAX_PER_PAGE)));
        self
    }

    /// Limita el numero de filas sin paginar.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn select_columns(&self) -> &str {
        self.select.as_deref().unwrap_or("*")
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn contains_filters(&self) -> &[(String, String)] {
        &self.contains
    }

    pub fn search_term(&self) -> Option<(&str, &str)> {
        self.search
            .as_ref()
            .map(|(column, term)| (column.as_str(), term.as_str()))
    }

    pub fn order(&self) -> Option<(&str, bool)> {
        self.order
            .as_ref()
            .map(|(column, ascending)| (column.as_str(), *ascending))
    }

    pub fn page(&self) -> Option<(u32, u32)> {
        self.page
    }

    pub fn row_limit(&self) -> Option<u32> {
        self.limit
    }

    /// Rango inclusivo de filas `(desde, hasta)` de la pagina pedida.
    pub fn range(&self) -> Option<(u64, u64)> {
        self.page.map(|(page, per_page)| {
            let from = u64::from(page - 1) * u64::from(per_page);
            (from, from + u64::from(per_page) - 1)
        })
    }
}

/// Una pagina de filas de contenido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPage {
    pub items: Vec<Value>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl ContentPage {
    /// Pagina unica con todas las filas.
    pub fn single(items: Vec<Value>) -> Self {
        let count = items.len();
        Self {
            total: count as u64,
            page: 1,
            per_page: u32::try_from(count).unwrap_or(u32::MAX),
            items,
        }
    }

    /// Numero total de paginas.
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }
}

/// Aplana el conteo embebido `blog_post_tags: [{"count": n}]` de cada tag en
/// un campo `post_count`, y ordena los tags por uso descendente.
pub fn aggregate_tag_counts(rows: Vec<Value>) -> Vec<Value> {
    let mut tags: Vec<Value> = rows
        .into_iter()
        .map(|mut row| {
            let count = row
                .get("blog_post_tags")
                .and_then(Value::as_array)
                .and_then(|embedded| embedded.first())
                .and_then(|first| first.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0);

            if let Some(object) = row.as_object_mut() {
                object.remove("blog_post_tags");
                object.insert("post_count".to_string(), Value::from(count));
            }
            row
        })
        .collect();

    tags.sort_by(|a, b| {
        let count = |v: &Value| v.get("post_count").and_then(Value::as_u64).unwrap_or(0);
        count(b).cmp(&count(a))
    });
    tags
}
