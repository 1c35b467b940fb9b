//! Request context handed to the SSR handler.

use std::collections::HashMap;

use rand::Rng;

use crate::timing::TimingContext;

/// Header that short-circuits SSR for a request.
///
/// Internal self-fetches always carry it so they cannot re-enter the handler.
pub const SKIP_SSR_HEADER: &str = "x-ssr-skip";

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new random request ID.
    pub fn generate() -> Self {
        let bytes: [u8; 8] = rand::thread_rng().gen();
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP headers, keyed by lowercase name.
pub type Headers = HashMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Other,
}

impl Method {
    /// Parse a method token (case-insensitive).
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "OPTIONS" => Self::Options,
            _ => Self::Other,
        }
    }

    /// Whether the method is safe to server-render (GET or HEAD).
    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    /// Method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Other => "OTHER",
        }
    }
}

impl From<&http::Method> for Method {
    fn from(method: &http::Method) -> Self {
        Self::parse(method.as_str())
    }
}

/// Read-only view of an incoming request.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL as received by the edge.
    pub url: String,
    /// HTTP headers (lowercase names).
    pub headers: Headers,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            url: url.into(),
            headers: HashMap::new(),
            timing: TimingContext::new(),
        }
    }

    /// Build a context from an `http::Request` whose URI may be path-only.
    ///
    /// Path-only URIs are completed from the `Host` header and `default_scheme`
    /// (or `X-Forwarded-Proto` when present).
    pub fn from_http<B>(req: &http::Request<B>, default_scheme: &str) -> Self {
        let headers: Headers = req
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let uri = req.uri();
        let url = if uri.scheme().is_some() && uri.authority().is_some() {
            uri.to_string()
        } else {
            let scheme = headers
                .get("x-forwarded-proto")
                .map(String::as_str)
                .unwrap_or(default_scheme);
            let host = headers
                .get("host")
                .map(String::as_str)
                .unwrap_or("localhost");
            let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
            format!("{}://{}{}", scheme, host, path)
        };

        let mut ctx = Self::new(Method::from(req.method()), url);
        ctx.headers = headers;
        ctx
    }

    /// Add a header (name is lowercased).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_ascii_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the request asked to skip SSR.
    pub fn wants_skip(&self) -> bool {
        self.header(SKIP_SSR_HEADER).is_some()
    }
}
