//! Response headers for rendered pages and redirects.

use edge_assets::AssetSource;
use edge_security::{ContentHash, ContentSecurityPolicy, CSP_REPORT_ONLY_HEADER};
use http::{header, Response, StatusCode};

use crate::policy::RouteCachePolicy;

/// Header names specific to the shim.
pub mod header_names {
    /// Marks a response as server-rendered.
    pub const X_SSR_GENERATED: &str = "X-SSR-Generated";
    /// Asset tier that produced the bundle tags.
    pub const X_SSR_ASSETS: &str = "X-SSR-Assets";
    /// Content hash backing the ETag.
    pub const X_CONTENT_HASH: &str = "X-Content-Hash";
}

/// Content type of rendered pages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Builder for rendered-page response headers.
#[derive(Debug, Default)]
pub struct SsrHeadersBuilder {
    policy: RouteCachePolicy,
    content_hash: Option<ContentHash>,
    csp: Option<String>,
    asset_source: Option<AssetSource>,
}

impl SsrHeadersBuilder {
    /// Create a builder using the rendered-page policy.
    pub fn new() -> Self {
        Self {
            policy: RouteCachePolicy::ssr_page(),
            ..Default::default()
        }
    }

    /// Replace the cache policy.
    pub fn policy(mut self, policy: RouteCachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the content hash (ETag and `X-Content-Hash`).
    pub fn content_hash(mut self, hash: ContentHash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    /// Set the report-only policy.
    pub fn csp(mut self, policy: &ContentSecurityPolicy) -> Self {
        self.csp = Some(policy.header_value());
        self
    }

    /// Set the asset tier diagnostic.
    pub fn asset_source(mut self, source: AssetSource) -> Self {
        self.asset_source = Some(source);
        self
    }

    /// Build the headers.
    pub fn build(self) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                header::CONTENT_TYPE.to_string(),
                HTML_CONTENT_TYPE.to_string(),
            ),
            (
                header::CACHE_CONTROL.to_string(),
                self.policy.cache_control_header().to_string(),
            ),
        ];

        for (name, value) in self.policy.legacy_header_pairs() {
            headers.push((name.to_string(), value.to_string()));
        }

        if let Some(vary) = self.policy.vary_header() {
            headers.push((header::VARY.to_string(), vary));
        }

        if let Some(hash) = &self.content_hash {
            headers.push((header::ETAG.to_string(), hash.etag()));
        }

        if let Some(csp) = self.csp {
            headers.push((CSP_REPORT_ONLY_HEADER.to_string(), csp));
        }

        headers.push((header_names::X_SSR_GENERATED.to_string(), "true".to_string()));

        if let Some(source) = self.asset_source {
            headers.push((header_names::X_SSR_ASSETS.to_string(), source.to_string()));
        }

        if let Some(hash) = self.content_hash {
            headers.push((header_names::X_CONTENT_HASH.to_string(), hash.to_string()));
        }

        headers
    }
}

/// Build a `200` HTML response.
pub fn html_response(
    body: String,
    headers: Vec<(String, String)>,
) -> Result<Response<String>, http::Error> {
    let mut builder = Response::builder().status(StatusCode::OK);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder.body(body)
}

/// Build a permanent redirect to an absolute `location`.
pub fn redirect_response(location: &str) -> Result<Response<String>, http::Error> {
    let policy = RouteCachePolicy::no_store();
    let mut builder = Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .header(header::CACHE_CONTROL, policy.cache_control_header());
    for (name, value) in policy.legacy_header_pairs() {
        builder = builder.header(name, value);
    }
    builder.body(String::new())
}
