//! Internal origin selection for self-fetches.

use std::fmt;

use edge_core::{env_vars, SiteConfig};
use edge_security::SanitizedUrl;
use url::Url;

/// Where the chosen internal origin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSource {
    /// Platform deploy URL.
    Deploy,
    /// Explicit internal origin.
    Internal,
    /// Platform site URL.
    Site,
    /// The request's own origin.
    Request,
}

impl OriginSource {
    /// Configuration variable backing this source, if any.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Self::Deploy => Some(env_vars::DEPLOY_URL),
            Self::Internal => Some(env_vars::SSR_INTERNAL_ORIGIN),
            Self::Site => Some(env_vars::SITE_URL),
            Self::Request => None,
        }
    }
}

impl fmt::Display for OriginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.env_var() {
            Some(var) => f.write_str(var),
            None => f.write_str("request"),
        }
    }
}

/// Origin used for manifest and index fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalOrigin {
    /// `scheme://host[:port]`.
    pub origin: String,
    /// Where it came from.
    pub source: OriginSource,
}

/// Pick the origin for internal fetches.
///
/// Fetching from the host that received the request would re-enter the
/// shim, so configured origins on a different host win:
/// the deploy URL first, then the internal origin, then the site URL.
/// The request origin is the last resort.
pub fn pick_internal_origin(config: &SiteConfig, request: &SanitizedUrl) -> InternalOrigin {
    let candidates = [
        (OriginSource::Deploy, config.deploy_url.as_deref()),
        (OriginSource::Internal, config.internal_origin.as_deref()),
        (OriginSource::Site, config.site_url.as_deref()),
    ];

    for (source, raw) in candidates {
        let Some(raw) = raw else { continue };
        match candidate_origin(raw, request.hostname()) {
            Some(origin) => return InternalOrigin { origin, source },
            None => {
                tracing::debug!(source = %source, value = raw, "internal origin candidate skipped");
            }
        }
    }

    InternalOrigin {
        origin: request.origin(),
        source: OriginSource::Request,
    }
}

/// Origin of `raw` if it is an http(s) URL on a host other than `request_host`.
fn candidate_origin(raw: &str, request_host: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if host.eq_ignore_ascii_case(request_host) {
        return None;
    }
    Some(url.origin().ascii_serialization())
}
