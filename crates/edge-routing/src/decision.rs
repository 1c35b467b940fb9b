//! Bypass and redirect decisions.

use std::fmt;

use edge_core::RequestContext;
use edge_security::SanitizedUrl;

/// File extensions always served by the platform.
pub const STATIC_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "json", "xml", "txt", "ico", "png", "jpg", "jpeg", "gif", "svg",
    "webp", "avif", "woff", "woff2", "ttf", "otf", "eot", "mp4", "webm", "mp3", "pdf", "zip",
    "webmanifest", "wasm",
];

/// Path prefixes always served by the platform.
pub const RESERVED_PREFIXES: &[&str] = &[
    "/@vite",
    "/@react-refresh",
    "/@id/",
    "/@fs/",
    "/src/",
    "/node_modules/",
    "/assets/",
    "/admin",
    "/api/",
    "/.netlify/",
];

/// Retired paths and their canonical replacements.
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("/biblio-rename", "/figma-component-variant-renamer"),
    ("/biblio-renamer", "/figma-component-variant-renamer"),
];

const ADMIN_PATH: &str = "/admin";

/// Why a request is handed back to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// The request carries the skip header.
    SkipHeader,
    /// The URL is unparsable, not http(s), or on a disallowed host.
    UntrustedOrigin,
    /// Local development host.
    DevHost,
    /// Method other than GET or HEAD.
    Method,
    /// Static file or reserved path.
    StaticPath,
}

impl BypassReason {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipHeader => "skip-header",
            Self::UntrustedOrigin => "untrusted-origin",
            Self::DevHost => "dev-host",
            Self::Method => "method",
            Self::StaticPath => "static-path",
        }
    }
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Let the platform serve the request.
    Delegate(BypassReason),
    /// Permanent redirect to an absolute URL.
    Redirect { location: String },
    /// Render the page at `path` (normalized).
    Render { path: String },
}

impl RouteDecision {
    /// Whether the request will be rendered.
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}

/// Strip trailing slashes, keeping the root.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Canonical target of a retired path.
pub fn legacy_alias(path: &str) -> Option<&'static str> {
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == path)
        .map(|(_, canonical)| *canonical)
}

/// Whether `path` has one of the static file extensions.
pub fn has_static_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Whether `path` starts with a reserved prefix.
pub fn has_reserved_prefix(path: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Whether the platform serves `path` directly.
pub fn is_bypass_path(path: &str) -> bool {
    has_static_extension(path) || has_reserved_prefix(path)
}

/// Whether `path` is the admin area.
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PATH
        || path
            .strip_prefix(ADMIN_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Routing switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Render dev hosts instead of delegating them (local preview).
    pub render_dev_hosts: bool,
}

/// Decide how to handle a request with default options.
///
/// `url` is the sanitized request URL, `None` when sanitizing rejected it.
pub fn decide(ctx: &RequestContext, url: Option<&SanitizedUrl>) -> RouteDecision {
    decide_with(ctx, url, &RouteOptions::default())
}

/// Decide how to handle a request.
///
/// Rules are evaluated in order and the first match wins.
pub fn decide_with(
    ctx: &RequestContext,
    url: Option<&SanitizedUrl>,
    options: &RouteOptions,
) -> RouteDecision {
    if ctx.wants_skip() {
        return RouteDecision::Delegate(BypassReason::SkipHeader);
    }

    let Some(url) = url else {
        return RouteDecision::Delegate(BypassReason::UntrustedOrigin);
    };

    if url.is_dev() && !options.render_dev_hosts {
        return RouteDecision::Delegate(BypassReason::DevHost);
    }

    if !ctx.method.is_renderable() {
        return RouteDecision::Delegate(BypassReason::Method);
    }

    let original = url.pathname();
    let normalized = normalize_path(original);

    if let Some(canonical) = legacy_alias(normalized) {
        return RouteDecision::Redirect {
            location: url.with_path_keep_query(canonical),
        };
    }

    // `/assets/` must not be normalized out of its reserved prefix.
    if is_bypass_path(original) || is_bypass_path(normalized) {
        return RouteDecision::Delegate(BypassReason::StaticPath);
    }

    if normalized != original {
        return RouteDecision::Redirect {
            location: url.with_path_keep_query(normalized),
        };
    }

    RouteDecision::Render {
        path: normalized.to_string(),
    }
}
