//! Per-response nonces and nonce-scoped Content Security Policy.

use std::fmt;

use rand::Rng;

/// Header carrying the (non-enforcing) policy.
pub const CSP_REPORT_ONLY_HEADER: &str = "Content-Security-Policy-Report-Only";

/// External script origins used by the instrumentation snippets.
const SCRIPT_SRC_EXTERNAL: &[&str] = &[
    "https://www.googletagmanager.com",
    "https://www.google-analytics.com",
];

/// External connect origins for analytics beacons.
const CONNECT_SRC_EXTERNAL: &[&str] = &[
    "https://www.google-analytics.com",
    "https://region1.google-analytics.com",
    "https://analytics.google.com",
];

/// Random per-response nonce shared by every inline script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    /// Generate a nonce from 16 random bytes, hex-encoded.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Nonce value as placed in `nonce="..."` attributes.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Source expression for CSP directives (`'nonce-...'`).
    pub fn source(&self) -> String {
        format!("'nonce-{}'", self.0)
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Content Security Policy as an ordered list of directives.
#[derive(Debug, Clone, Default)]
pub struct ContentSecurityPolicy {
    directives: Vec<(String, Vec<String>)>,
}

impl ContentSecurityPolicy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append sources to a directive, creating it if needed.
    pub fn directive(mut self, name: &str, sources: &[&str]) -> Self {
        let sources = sources.iter().map(|s| s.to_string());
        match self.directives.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.extend(sources),
            None => self.directives.push((name.to_string(), sources.collect())),
        }
        self
    }

    /// Policy for a server-rendered page.
    ///
    /// Inline scripts are admitted only through `nonce`. Development pages
    /// additionally allow the dev server's websocket.
    pub fn for_ssr(nonce: &CspNonce, is_production: bool) -> Self {
        let nonce_source = nonce.source();

        let mut script_src = vec!["'self'", nonce_source.as_str()];
        script_src.extend_from_slice(SCRIPT_SRC_EXTERNAL);

        let mut connect_src = vec!["'self'"];
        connect_src.extend_from_slice(CONNECT_SRC_EXTERNAL);
        if !is_production {
            connect_src.extend_from_slice(&["ws:", "wss:"]);
        }

        Self::new()
            .directive("default-src", &["'self'"])
            .directive("script-src", &script_src)
            .directive("style-src", &["'self'", "'unsafe-inline'"])
            .directive("img-src", &["'self'", "data:", "https:"])
            .directive("font-src", &["'self'", "data:"])
            .directive("connect-src", &connect_src)
            .directive("frame-ancestors", &["'self'"])
            .directive("base-uri", &["'self'"])
            .directive("form-action", &["'self'"])
            .directive("object-src", &["'none'"])
    }

    /// Sources of a directive, if present.
    pub fn sources(&self, name: &str) -> Option<&[String]> {
        self.directives
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_slice())
    }

    /// Render the header value.
    pub fn header_value(&self) -> String {
        self.directives
            .iter()
            .map(|(name, sources)| {
                if sources.is_empty() {
                    name.clone()
                } else {
                    format!("{} {}", name, sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
