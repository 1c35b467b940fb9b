//! Cache policy for server-rendered pages.

use serde::{Deserialize, Serialize};

/// Cache-Control value for pages that must always be revalidated.
pub const NO_STORE_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Vary rule for cache key variance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VaryRule {
    /// Vary by HTTP header.
    Header(String),
    /// Vary by device type.
    DeviceType,
}

impl VaryRule {
    /// Create a header vary rule.
    pub fn header(name: impl Into<String>) -> Self {
        Self::Header(name.into())
    }

    /// Header name this rule varies on.
    pub fn header_name(&self) -> &str {
        match self {
            Self::Header(h) => h,
            Self::DeviceType => "User-Agent",
        }
    }
}

/// Route-level cache policy.
///
/// Rendered pages embed per-request nonces, so they are never stored by
/// shared or private caches. The ETag still lets clients revalidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCachePolicy {
    /// Vary rules for the response.
    pub vary: Vec<VaryRule>,
    /// Emit `Pragma`/`Expires` for HTTP/1.0 caches.
    pub legacy_headers: bool,
}

impl RouteCachePolicy {
    /// Policy that forbids caching.
    pub fn no_store() -> Self {
        Self {
            vary: Vec::new(),
            legacy_headers: true,
        }
    }

    /// Policy for server-rendered HTML pages.
    pub fn ssr_page() -> Self {
        Self::no_store()
            .vary_on(VaryRule::header("Accept"))
            .vary_on(VaryRule::DeviceType)
    }

    /// Add a vary rule.
    pub fn vary_on(mut self, rule: VaryRule) -> Self {
        if !self.vary.contains(&rule) {
            self.vary.push(rule);
        }
        self
    }

    /// Generate Cache-Control header value.
    pub fn cache_control_header(&self) -> &'static str {
        NO_STORE_CACHE_CONTROL
    }

    /// Generate Vary header value.
    pub fn vary_header(&self) -> Option<String> {
        if self.vary.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.vary.iter().map(VaryRule::header_name).collect();
        Some(names.join(", "))
    }

    /// `Pragma` and `Expires` pairs, when enabled.
    pub fn legacy_header_pairs(&self) -> Vec<(&'static str, &'static str)> {
        if self.legacy_headers {
            vec![("Pragma", "no-cache"), ("Expires", "0")]
        } else {
            Vec::new()
        }
    }
}
