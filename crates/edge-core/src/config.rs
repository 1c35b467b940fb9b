//! Site configuration derived from the environment.
//!
//! The configuration is read once at startup and shared immutably by every
//! request. Nothing in the request path re-reads the environment.

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable names consulted by [`SiteConfig::from_env`].
pub mod env_vars {
    /// Explicit SSR host allow-list.
    pub const SSR_ALLOWED_HOSTS: &str = "SSR_ALLOWED_HOSTS";
    /// Generic allowed-origins list shared with other services.
    pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
    /// Platform-provided primary site URL.
    pub const SITE_URL: &str = "URL";
    /// Platform-provided deploy URL.
    pub const DEPLOY_URL: &str = "DEPLOY_URL";
    /// Origin override for internal self-fetches.
    pub const SSR_INTERNAL_ORIGIN: &str = "SSR_INTERNAL_ORIGIN";
    /// Analytics measurement id.
    pub const SSR_ANALYTICS_ID: &str = "SSR_ANALYTICS_ID";
    /// Third-party tracking loader script URL.
    pub const SSR_TRACKING_SCRIPT_URL: &str = "SSR_TRACKING_SCRIPT_URL";
    /// Site name used as the default page title.
    pub const SSR_SITE_NAME: &str = "SSR_SITE_NAME";
}

/// Errors found while validating a [`SiteConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: unsupported scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },
}

/// Immutable site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Hosts explicitly allowed to receive SSR output.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    /// Generic allowed origins (normalized to hosts by the allow-list).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Platform-provided primary site URL.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Platform-managed deploy URL.
    #[serde(default)]
    pub deploy_url: Option<String>,
    /// Alternate origin for internal self-fetches.
    #[serde(default)]
    pub internal_origin: Option<String>,
    /// Analytics measurement id; the analytics loader is omitted without it.
    #[serde(default)]
    pub analytics_id: Option<String>,
    /// Tracking loader script URL; the tracking loader is omitted without it.
    #[serde(default)]
    pub tracking_script_url: Option<String>,
    /// Site name used as the fallback title.
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

fn default_site_name() -> String {
    "Marketing Site".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            allowed_origins: Vec::new(),
            site_url: None,
            deploy_url: None,
            internal_origin: None,
            analytics_id: None,
            tracking_script_url: None,
            site_name: default_site_name(),
        }
    }
}

impl SiteConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let single = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let list = |key: &str| lookup(key).map(|v| split_list(&v)).unwrap_or_default();

        Self {
            allowed_hosts: list(env_vars::SSR_ALLOWED_HOSTS),
            allowed_origins: list(env_vars::ALLOWED_ORIGINS),
            site_url: single(env_vars::SITE_URL),
            deploy_url: single(env_vars::DEPLOY_URL),
            internal_origin: single(env_vars::SSR_INTERNAL_ORIGIN),
            analytics_id: single(env_vars::SSR_ANALYTICS_ID),
            tracking_script_url: single(env_vars::SSR_TRACKING_SCRIPT_URL),
            site_name: single(env_vars::SSR_SITE_NAME).unwrap_or_else(default_site_name),
        }
    }

    /// Overlay values from `overrides`; any value it sets replaces ours.
    ///
    /// Used to let the environment win over a configuration file.
    pub fn with_overrides(mut self, overrides: SiteConfig) -> Self {
        if !overrides.allowed_hosts.is_empty() {
            self.allowed_hosts = overrides.allowed_hosts;
        }
        if !overrides.allowed_origins.is_empty() {
            self.allowed_origins = overrides.allowed_origins;
        }
        self.site_url = overrides.site_url.or(self.site_url);
        self.deploy_url = overrides.deploy_url.or(self.deploy_url);
        self.internal_origin = overrides.internal_origin.or(self.internal_origin);
        self.analytics_id = overrides.analytics_id.or(self.analytics_id);
        self.tracking_script_url = overrides.tracking_script_url.or(self.tracking_script_url);
        if overrides.site_name != default_site_name() {
            self.site_name = overrides.site_name;
        }
        self
    }

    /// Set the explicit host allow-list.
    pub fn with_allowed_hosts(mut self, hosts: &[&str]) -> Self {
        self.allowed_hosts = hosts.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Set the platform deploy URL.
    pub fn with_deploy_url(mut self, url: impl Into<String>) -> Self {
        self.deploy_url = Some(url.into());
        self
    }

    /// Set the primary site URL.
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    /// Set the internal origin override.
    pub fn with_internal_origin(mut self, url: impl Into<String>) -> Self {
        self.internal_origin = Some(url.into());
        self
    }

    /// Set the analytics measurement id.
    pub fn with_analytics_id(mut self, id: impl Into<String>) -> Self {
        self.analytics_id = Some(id.into());
        self
    }

    /// Set the tracking loader script URL.
    pub fn with_tracking_script_url(mut self, url: impl Into<String>) -> Self {
        self.tracking_script_url = Some(url.into());
        self
    }

    /// Check that every configured URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        let urls = [
            ("site_url", &self.site_url),
            ("deploy_url", &self.deploy_url),
            ("internal_origin", &self.internal_origin),
            ("tracking_script_url", &self.tracking_script_url),
        ];
        for (field, value) in urls {
            if let Some(value) = value {
                if let Err(e) = check_http_url(field, value) {
                    errors.push(e);
                }
            }
        }

        if self.site_name.trim().is_empty() {
            errors.push(ConfigError::Empty { field: "site_name" });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::UnsupportedScheme {
            field,
            scheme: other.to_string(),
        }),
    }
}

/// Split a comma- or whitespace-separated list, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_empty() {
        let config = SiteConfig::from_lookup(|_| None);
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.site_name, "Marketing Site");
    }

    #[test]
    fn test_from_lookup_reads_lists_and_urls() {
        let config = SiteConfig::from_lookup(lookup_from(&[
            ("SSR_ALLOWED_HOSTS", "example.com, *.example.com"),
            ("ALLOWED_ORIGINS", "https://app.example.com https://docs.example.com"),
            ("URL", "https://www.example.com"),
            ("DEPLOY_URL", "https://deploy-1--site.netlify.app"),
            ("SSR_SITE_NAME", "Example"),
        ]));

        assert_eq!(config.allowed_hosts, vec!["example.com", "*.example.com"]);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.site_url.as_deref(), Some("https://www.example.com"));
        assert_eq!(
            config.deploy_url.as_deref(),
            Some("https://deploy-1--site.netlify.app")
        );
        assert_eq!(config.site_name, "Example");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = SiteConfig::from_lookup(lookup_from(&[("URL", "   "), ("SSR_ALLOWED_HOSTS", " , ")]));
        assert!(config.site_url.is_none());
        assert!(config.allowed_hosts.is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b  c,,\td"), vec!["a", "b", "c", "d"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_with_overrides() {
        let file = SiteConfig::default()
            .with_site_url("https://file.example.com")
            .with_analytics_id("G-FILE")
            .with_allowed_hosts(&["file.example.com"]);
        let env = SiteConfig::default().with_site_url("https://env.example.com");

        let merged = file.with_overrides(env);
        assert_eq!(merged.site_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(merged.analytics_id.as_deref(), Some("G-FILE"));
        assert_eq!(merged.allowed_hosts, vec!["file.example.com"]);
    }

    #[test]
    fn test_validate() {
        assert!(SiteConfig::default().validate().is_ok());

        let bad = SiteConfig::default()
            .with_site_url("not a url")
            .with_deploy_url("ftp://files.example.com");
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ConfigError::InvalidUrl { field: "site_url", .. }));
        assert!(matches!(
            errors[1],
            ConfigError::UnsupportedScheme { field: "deploy_url", .. }
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SiteConfig = serde_json::from_str(r#"{"site_url": "https://a.example"}"#).unwrap();
        assert_eq!(config.site_url.as_deref(), Some("https://a.example"));
        assert_eq!(config.site_name, "Marketing Site");
    }
}
