//! Common type definitions for the Bufete cache layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard expiry presets for cached site data.
pub mod ttl {
    use std::time::Duration;

    /// Volatile listings (search results, paginated archives).
    pub const SHORT: Duration = Duration::from_secs(5 * 60);
    /// Public content listings (blog posts, services).
    pub const MEDIUM: Duration = Duration::from_secs(30 * 60);
    /// Slow-moving reference data (categories, tags).
    pub const LONG: Duration = Duration::from_secs(60 * 60);
    /// Site settings and other near-static data.
    pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    /// Converts a TTL into the whole seconds sent with `EX`.
    ///
    /// Backends reject `EX 0`, so partial seconds round up.
    pub fn expiry_secs(ttl: Duration) -> u64 {
        let secs = ttl.as_secs();
        if ttl.subsec_nanos() > 0 || secs == 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Scope of a page revalidation.
///
/// `Page` marks a single route stale, `Layout` marks the route and
/// everything rendered beneath it.
///
/// # Example
///
/// ```
/// use bufete_core::RevalidateKind;
///
/// let kind: RevalidateKind = "layout".parse().unwrap();
/// assert_eq!(kind, RevalidateKind::Layout);
/// assert_eq!(kind.as_str(), "layout");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevalidateKind {
    /// A single route.
    #[default]
    Page,
    /// A route and its whole subtree.
    Layout,
}

impl RevalidateKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for RevalidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevalidateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "layout" => Ok(Self::Layout),
            other => Err(format!("unknown revalidation kind '{}'", other)),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
}

impl RateLimitDecision {
    /// An accepted request with `remaining` requests left.
    pub fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
        }
    }

    /// A rejected request.
    pub fn reject() -> Self {
        Self {
            allowed: false,
            remaining: 0,
        }
    }
}
