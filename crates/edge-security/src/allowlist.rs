//! Host allow-list and request URL sanitizing.
//!
//! The allow-list is built once from [`SiteConfig`] and decides whether a
//! request's host may receive server-rendered output. An empty allow-list
//! admits every host: with nothing configured the shim stays fail-open.

use std::fmt;

use edge_core::SiteConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Result type for allowlist operations.
pub type AllowlistResult<T> = Result<T, AllowlistError>;

/// Reasons a request URL is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllowlistError {
    #[error("host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("scheme not allowed: {0}")]
    SchemeNotAllowed(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Hostnames that always pass the allow-list and mark a request as local development.
const DEV_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1", "[::1]"];

/// Whether `hostname` is a local development host.
pub fn is_dev_host(hostname: &str) -> bool {
    let host = hostname.trim_end_matches('.').to_ascii_lowercase();
    DEV_HOSTS.contains(&host.as_str()) || host.ends_with(".localhost")
}

/// A single allow-list rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostRule {
    /// Exact hostname.
    Exact(String),
    /// `*.suffix`: the suffix itself and any subdomain of it.
    Suffix(String),
}

impl HostRule {
    /// Parse an allow-list entry (bare host, origin or `*.suffix`).
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim().to_ascii_lowercase();
        if entry.is_empty() {
            return None;
        }

        if let Some(suffix) = entry.strip_prefix("*.") {
            let suffix = normalize_hostname(suffix)?;
            return Some(Self::Suffix(suffix));
        }

        normalize_hostname(&entry).map(Self::Exact)
    }

    /// Whether this rule admits `host` (already lowercase).
    pub fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(h) => host == h,
            Self::Suffix(suffix) => {
                host == suffix
                    || (host.len() > suffix.len()
                        && host.ends_with(suffix.as_str())
                        && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
            }
        }
    }
}

impl fmt::Display for HostRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(h) => write!(f, "{}", h),
            Self::Suffix(s) => write!(f, "*.{}", s),
        }
    }
}

/// Reduce an origin, URL or `host:port` entry to a bare lowercase hostname.
fn normalize_hostname(entry: &str) -> Option<String> {
    let host = if entry.contains("://") {
        Url::parse(entry).ok()?.host_str()?.to_string()
    } else {
        let authority = entry.split(['/', '?', '#']).next().unwrap_or(entry);
        if authority.starts_with('[') {
            // [::1]:8080
            match authority.find(']') {
                Some(end) => authority[..=end].to_string(),
                None => return None,
            }
        } else {
            match authority.rsplit_once(':') {
                Some((h, port)) if port.chars().all(|c| c.is_ascii_digit()) => h.to_string(),
                _ => authority.to_string(),
            }
        }
    };

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Host allow-list for SSR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostAllowlist {
    rules: Vec<HostRule>,
}

impl HostAllowlist {
    /// Create an empty (fail-open) allowlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the allowlist from every configured source.
    ///
    /// Sources: the explicit allow-list, the generic allowed origins, the
    /// platform site URL and the platform deploy URL.
    pub fn from_config(config: &SiteConfig) -> Self {
        let entries = config
            .allowed_hosts
            .iter()
            .chain(config.allowed_origins.iter())
            .chain(config.site_url.iter())
            .chain(config.deploy_url.iter());

        entries.fold(Self::new(), |list, entry| list.allow(entry))
    }

    /// Allow an entry; unparsable entries are ignored.
    pub fn allow(mut self, entry: &str) -> Self {
        match HostRule::parse(entry) {
            Some(rule) if !self.rules.contains(&rule) => self.rules.push(rule),
            Some(_) => {}
            None => tracing::warn!(entry, "ignoring unparsable allow-list entry"),
        }
        self
    }

    /// Whether no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Configured rules.
    pub fn rules(&self) -> &[HostRule] {
        &self.rules
    }

    /// Check a hostname against the allowlist (case-insensitive).
    pub fn is_host_allowed(&self, hostname: &str) -> bool {
        let host = hostname.trim_end_matches('.').to_ascii_lowercase();

        if is_dev_host(&host) {
            return true;
        }

        if self.rules.is_empty() {
            return true;
        }

        self.rules.iter().any(|rule| rule.matches(&host))
    }

    /// Validate a request URL, explaining any refusal.
    pub fn check_url(&self, raw: &str) -> AllowlistResult<SanitizedUrl> {
        let mut url = Url::parse(raw).map_err(|e| AllowlistError::InvalidUrl(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(AllowlistError::SchemeNotAllowed(other.to_string())),
        }

        let hostname = url.host_str().ok_or(AllowlistError::MissingHost)?.to_string();
        if !self.is_host_allowed(&hostname) {
            return Err(AllowlistError::HostNotAllowed(hostname));
        }

        url.set_fragment(None);
        Ok(SanitizedUrl { url })
    }

    /// Validate a request URL; `None` means "do not attempt SSR".
    pub fn sanitize_request_url(&self, raw: &str) -> Option<SanitizedUrl> {
        self.check_url(raw).ok()
    }
}

/// A validated request URL with its fragment removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedUrl {
    url: Url,
}

impl SanitizedUrl {
    /// Scheme with trailing colon (`https:`).
    pub fn protocol(&self) -> String {
        format!("{}:", self.url.scheme())
    }

    /// Hostname without port.
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Host including a non-default port.
    pub fn host(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{}", self.hostname(), port),
            None => self.hostname().to_string(),
        }
    }

    /// Path component (always starts with `/`).
    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// Query string including the leading `?`, or empty.
    pub fn search(&self) -> String {
        match self.url.query() {
            Some(q) if !q.is_empty() => format!("?{}", q),
            _ => String::new(),
        }
    }

    /// Fragment; always empty after sanitizing.
    pub fn hash(&self) -> &str {
        self.url.fragment().unwrap_or_default()
    }

    /// `scheme://host[:port]`.
    pub fn origin(&self) -> String {
        format!("{}//{}", self.protocol(), self.host())
    }

    /// Whether the host is a local development host.
    pub fn is_dev(&self) -> bool {
        is_dev_host(self.hostname())
    }

    /// Absolute URL for `path` on this origin with this URL's query string.
    pub fn with_path_keep_query(&self, path: &str) -> String {
        format!("{}{}{}", self.origin(), path, self.search())
    }

    /// Underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for SanitizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_list() -> HostAllowlist {
        HostAllowlist::new().allow("example.com")
    }

    // === Rule Parsing Tests ===

    #[test]
    fn test_rule_parse_forms() {
        assert_eq!(
            HostRule::parse("https://WWW.Example.com/path"),
            Some(HostRule::Exact("www.example.com".into()))
        );
        assert_eq!(
            HostRule::parse("example.com:8443"),
            Some(HostRule::Exact("example.com".into()))
        );
        assert_eq!(
            HostRule::parse("*.example.com"),
            Some(HostRule::Suffix("example.com".into()))
        );
        assert_eq!(
            HostRule::parse("example.com."),
            Some(HostRule::Exact("example.com".into()))
        );
        assert_eq!(HostRule::parse("   "), None);
    }

    #[test]
    fn test_suffix_rule_matching() {
        let rule = HostRule::Suffix("example.com".into());
        assert!(rule.matches("example.com"));
        assert!(rule.matches("www.example.com"));
        assert!(rule.matches("a.b.example.com"));
        assert!(!rule.matches("badexample.com"));
        assert!(!rule.matches("example.com.evil.net"));
    }

    // === Host Check Tests ===

    #[test]
    fn test_exact_host_allowed_case_insensitive() {
        let list = example_list();
        assert!(list.is_host_allowed("example.com"));
        assert!(list.is_host_allowed("EXAMPLE.COM"));
        assert!(!list.is_host_allowed("www.example.com"));
        assert!(!list.is_host_allowed("evil.example"));
    }

    #[test]
    fn test_dev_hosts_always_allowed() {
        let list = example_list();
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "[::1]", "app.localhost"] {
            assert!(list.is_host_allowed(host), "{host} should be allowed");
        }
    }

    #[test]
    fn test_empty_allowlist_is_fail_open() {
        let list = HostAllowlist::new();
        assert!(list.is_empty());
        assert!(list.is_host_allowed("anything.example"));
        assert!(list.sanitize_request_url("https://evil.example/").is_some());
    }

    #[test]
    fn test_from_config_collects_all_sources() {
        let config = SiteConfig {
            allowed_hosts: vec!["*.example.com".into()],
            allowed_origins: vec!["https://partner.example.org".into()],
            site_url: Some("https://www.example.net".into()),
            deploy_url: Some("https://deploy-42--site.netlify.app".into()),
            ..SiteConfig::default()
        };

        let list = HostAllowlist::from_config(&config);
        assert_eq!(list.rules().len(), 4);
        assert!(list.is_host_allowed("docs.example.com"));
        assert!(list.is_host_allowed("partner.example.org"));
        assert!(list.is_host_allowed("www.example.net"));
        assert!(list.is_host_allowed("deploy-42--site.netlify.app"));
        assert!(!list.is_host_allowed("example.net"));
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let list = HostAllowlist::new()
            .allow("example.com")
            .allow("https://example.com");
        assert_eq!(list.rules().len(), 1);
    }

    // === Sanitize Tests ===

    #[test]
    fn test_sanitize_rejects_disallowed_host() {
        let list = example_list();
        assert!(list.sanitize_request_url("https://evil.example/").is_none());
        assert_eq!(
            list.check_url("https://evil.example/"),
            Err(AllowlistError::HostNotAllowed("evil.example".into()))
        );
    }

    #[test]
    fn test_sanitize_rejects_non_http_schemes() {
        let list = HostAllowlist::new();
        assert!(list.sanitize_request_url("ftp://example.com/file").is_none());
        assert!(list.sanitize_request_url("javascript:alert(1)").is_none());
        assert!(list.sanitize_request_url("not a url").is_none());
    }

    #[test]
    fn test_sanitize_clears_hash() {
        let list = example_list();
        for raw in [
            "https://example.com/docs#intro",
            "https://example.com/#",
            "https://example.com/a?b=c#d",
            "https://example.com/plain",
        ] {
            let url = list.sanitize_request_url(raw).unwrap();
            assert_eq!(url.hash(), "");
            assert!(!url.to_string().contains('#'));
        }
    }

    #[test]
    fn test_sanitized_parts() {
        let list = HostAllowlist::new();
        let url = list
            .sanitize_request_url("http://localhost:8888/docs/?ref=x#top")
            .unwrap();

        assert_eq!(url.protocol(), "http:");
        assert_eq!(url.hostname(), "localhost");
        assert_eq!(url.host(), "localhost:8888");
        assert_eq!(url.pathname(), "/docs/");
        assert_eq!(url.search(), "?ref=x");
        assert_eq!(url.origin(), "http://localhost:8888");
        assert!(url.is_dev());
        assert_eq!(
            url.with_path_keep_query("/docs"),
            "http://localhost:8888/docs?ref=x"
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let url = HostAllowlist::new()
            .sanitize_request_url("https://example.com/docs?")
            .unwrap();
        assert_eq!(url.search(), "");
    }
}
