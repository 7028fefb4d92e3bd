//! Cached site resources and their key bases.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bufete_core::{RevalidateKind, ttl};

/// Key base of the paginated blog listing.
pub const BLOG_POSTS_KEY: &str = "public-blog-posts";
/// Key base of a single blog post, parameterised by slug.
pub const BLOG_POST_KEY: &str = "public-blog-post";
/// Key base of the category list.
pub const BLOG_CATEGORIES_KEY: &str = "public-blog-categories";
/// Key base of the tag list with post counts.
pub const BLOG_TAGS_KEY: &str = "public-blog-tags";
/// Key base of the services list.
pub const SERVICES_KEY: &str = "public-services";
/// Key base of the site settings.
pub const SETTINGS_KEY: &str = "public-settings";

/// Recurso del sitio que se cachea.
///
/// Cada recurso conoce su tabla en el backend, las bases de key bajo las que
/// se guardan sus lecturas y las rutas que hay que revalidar cuando cambia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    BlogPosts,
    BlogCategories,
    BlogTags,
    Services,
    Settings,
}

impl ContentKind {
    /// Todos los recursos, en orden estable.
    pub const ALL: [ContentKind; 5] = [
        ContentKind::BlogPosts,
        ContentKind::BlogCategories,
        ContentKind::BlogTags,
        ContentKind::Services,
        ContentKind::Settings,
    ];

    /// Nombre en rutas y logs (`blog-posts`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogPosts => "blog-posts",
            Self::BlogCategories => "blog-categories",
            Self::BlogTags => "blog-tags",
            Self::Services => "services",
            Self::Settings => "settings",
        }
    }

    /// Tabla del backend relacional.
    pub fn table(&self) -> &'static str {
        match self {
            Self::BlogPosts => "blog_posts",
            Self::BlogCategories => "blog_categories",
            Self::BlogTags => "blog_tags",
            Self::Services => "services",
            Self::Settings => "site_settings",
        }
    }

    /// Bases de key que una escritura sobre este recurso deja obsoletas.
    ///
    /// Categorias y tags aparecen embebidos en el listado de posts, por eso
    /// lo arrastran.
    pub fn cache_keys(&self) -> &'static [&'static str] {
        match self {
            Self::BlogPosts => &[BLOG_POSTS_KEY, BLOG_POST_KEY, BLOG_TAGS_KEY],
            Self::BlogCategories => &[BLOG_CATEGORIES_KEY, BLOG_POSTS_KEY],
            Self::BlogTags => &[BLOG_TAGS_KEY, BLOG_POSTS_KEY],
            Self::Services => &[SERVICES_KEY],
            Self::Settings => &[SETTINGS_KEY],
        }
    }

    /// TTL de las lecturas de este recurso.
    pub fn ttl(&self) -> Duration {
        match self {
            Self::BlogPosts | Self::Services => ttl::MEDIUM,
            Self::BlogCategories | Self::BlogTags => ttl::LONG,
            Self::Settings => ttl::DAY,
        }
    }

    /// Rutas del frontend que muestran este recurso.
    pub fn affected_paths(&self) -> &'static [(&'static str, RevalidateKind)] {
        match self {
            Self::BlogPosts => &[("/blog", RevalidateKind::Layout), ("/", RevalidateKind::Page)],
            Self::BlogCategories | Self::BlogTags => &[("/blog", RevalidateKind::Layout)],
            Self::Services => &[
                ("/servicios", RevalidateKind::Layout),
                ("/", RevalidateKind::Page),
            ],
            Self::Settings => &[("/", RevalidateKind::Layout)],
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown content kind '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_accepts_table_style_names() {
        assert_eq!("Blog_Posts".parse::<ContentKind>(), Ok(ContentKind::BlogPosts));
        assert!("users".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_every_kind_has_keys_and_paths() {
        for kind in ContentKind::ALL {
            assert!(!kind.cache_keys().is_empty(), "{} has no keys", kind);
            assert!(!kind.affected_paths().is_empty(), "{} has no paths", kind);
        }
    }

    #[test]
    fn test_blog_posts_clear_the_listing_key() {
        assert!(ContentKind::BlogPosts.cache_keys().contains(&"public-blog-posts"));
        assert_eq!(ContentKind::BlogPosts.ttl(), Duration::from_secs(1800));
        assert_eq!(ContentKind::Settings.table(), "site_settings");
    }
}
