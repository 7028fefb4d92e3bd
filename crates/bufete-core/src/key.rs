//! Cache key construction.
//!
//! Keys are derived values: a logical resource name plus an optional set
//! of parameters. Parameter names are sorted before serialization so two
//! callers building the same key with a different insertion order always
//! land on the same backend entry.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Separator between a resource name and its serialized parameters.
pub const KEY_DELIMITER: char = '-';

/// Separator between the segments of a scoped (prefix-invalidatable) key.
pub const SCOPE_DELIMITER: char = ':';

/// Prefix used when a route path has no segments (the site root).
pub const ROOT_PATH_PREFIX: &str = "home";

/// Parameters that qualify a cache key.
///
/// Stored sorted by name, so the order of `with` calls never matters.
///
/// # Example
///
/// ```
/// use bufete_core::CacheParams;
///
/// let a = CacheParams::new().with("page", 2).with("category", "laboral");
/// let b = CacheParams::new().with("category", "laboral").with("page", 2);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheParams(BTreeMap<String, Value>);

impl CacheParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a parameter only when a value is present.
    ///
    /// Absent values are left out of the key entirely rather than being
    /// serialized as `null`.
    pub fn with_opt<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Inserts a parameter in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns true if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Serializes the parameters as a compact JSON object, names sorted.
    pub fn to_json(&self) -> String {
        let object: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Value::Object(object).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for CacheParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for CacheParams {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// A fully built cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already built key verbatim.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds a `prefix:id` key, reachable by prefix invalidation.
    ///
    /// ```
    /// use bufete_core::CacheKey;
    ///
    /// assert_eq!(CacheKey::scoped("blog", "42").as_str(), "blog:42");
    /// ```
    pub fn scoped(prefix: &str, id: impl fmt::Display) -> Self {
        Self(format!("{prefix}{SCOPE_DELIMITER}{id}"))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<&CacheKey> for CacheKey {
    fn from(key: &CacheKey) -> Self {
        key.clone()
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for CacheKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CacheKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Builds the cache key for a resource and its parameters.
///
/// The parameters are appended as sorted, compact JSON after a `-`; an
/// empty parameter set yields the bare prefix.
///
/// # Examples
///
/// ```
/// use bufete_core::{CacheParams, create_cache_key};
///
/// let key = create_cache_key("public-blog-posts", &CacheParams::new());
/// assert_eq!(key, "public-blog-posts");
///
/// let params = CacheParams::new().with("page", 1).with("category", "penal");
/// let key = create_cache_key("public-blog-posts", &params);
/// assert_eq!(key, r#"public-blog-posts-{"category":"penal","page":1}"#);
/// ```
pub fn create_cache_key(prefix: &str, params: &CacheParams) -> CacheKey {
    if params.is_empty() {
        return CacheKey::new(prefix);
    }

    CacheKey(format!("{prefix}{KEY_DELIMITER}{}", params.to_json()))
}

/// Returns the glob pattern matched by prefix invalidation.
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{prefix}{SCOPE_DELIMITER}*")
}

/// Derives the cache prefix for a site route.
///
/// Leading and trailing slashes are dropped and the remaining separators
/// become `:`; the root path maps to [`ROOT_PATH_PREFIX`].
///
/// ```
/// use bufete_core::prefix_for_path;
///
/// assert_eq!(prefix_for_path("/blog/despido-improcedente"), "blog:despido-improcedente");
/// assert_eq!(prefix_for_path("/"), "home");
/// ```
pub fn prefix_for_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return ROOT_PATH_PREFIX.to_string();
    }

    trimmed
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(&SCOPE_DELIMITER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_params_yield_bare_prefix() {
        let key = create_cache_key("public-services", &CacheParams::new());
        assert_eq!(key.as_str(), "public-services");
    }

    #[test]
    fn test_key_is_independent_of_insertion_order() {
        let a = CacheParams::new()
            .with("search", "herencia")
            .with("page", 3)
            .with("tag", "civil");
        let b = CacheParams::new()
            .with("tag", "civil")
            .with("search", "herencia")
            .with("page", 3);

        assert_eq!(
            create_cache_key("public-blog-posts", &a),
            create_cache_key("public-blog-posts", &b)
        );
    }

    #[test]
    fn test_distinct_values_yield_distinct_keys() {
        let page1 = CacheParams::new().with("page", 1);
        let page2 = CacheParams::new().with("page", 2);
        let page1_str = CacheParams::new().with("page", "1");

        let k1 = create_cache_key("public-blog-posts", &page1);
        let k2 = create_cache_key("public-blog-posts", &page2);
        let k3 = create_cache_key("public-blog-posts", &page1_str);

        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn test_params_are_sorted_in_output() {
        let params: CacheParams = [("z", json!(1)), ("a", json!(true)), ("m", json!(null))]
            .into_iter()
            .collect();

        let key = create_cache_key("x", &params);
        assert_eq!(key.as_str(), r#"x-{"a":true,"m":null,"z":1}"#);
    }

    #[test]
    fn test_with_opt_skips_missing_values() {
        let params = CacheParams::new()
            .with("page", 1)
            .with_opt("category", None::<String>)
            .with_opt("tag", Some("laboral"));

        assert_eq!(params.len(), 2);
        assert!(params.get("category").is_none());
        assert_eq!(params.get("tag"), Some(&json!("laboral")));
    }

    #[test]
    fn test_nested_values_serialize_compactly() {
        let params = CacheParams::new().with("filter", json!({"ids": [1, 2]}));
        let key = create_cache_key("p", &params);

        assert_eq!(key.as_str(), r#"p-{"filter":{"ids":[1,2]}}"#);
    }

    #[test]
    fn test_from_json_map() {
        let map = json!({"b": 2, "a": 1}).as_object().cloned().unwrap();
        let params = CacheParams::from(map);

        assert_eq!(params.to_json(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_scoped_key_and_pattern() {
        let key = CacheKey::scoped("blog", 7);
        assert_eq!(key.to_string(), "blog:7");
        assert_eq!(prefix_pattern("blog"), "blog:*");
    }

    #[test]
    fn test_prefix_for_path() {
        assert_eq!(prefix_for_path("/servicios"), "servicios");
        assert_eq!(prefix_for_path("/blog/post/"), "blog:post");
        assert_eq!(prefix_for_path("blog//post"), "blog:post");
        assert_eq!(prefix_for_path(""), "home");
        assert_eq!(prefix_for_path("/"), "home");
    }

    #[test]
    fn test_cache_key_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(create_cache_key("a", &CacheParams::new().with("x", 1)));

        assert!(set.contains(&CacheKey::new(r#"a-{"x":1}"#)));
    }
}
