//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use edge_core::SiteConfig;
use serde::{Deserialize, Serialize};

/// Config file names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["edge.toml", ".edge.toml", "edge.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Site settings; environment variables override them.
    #[serde(default)]
    pub site: SiteConfig,

    /// Local server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Site settings with values from `lookup` layered on top.
    pub fn site_with_env<F>(&self, lookup: F) -> SiteConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        self.site.clone().with_overrides(SiteConfig::from_lookup(lookup))
    }
}

/// Local server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Built SPA directory served for delegated requests.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    /// Directory of page content JSON files.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Scheme assumed when a request carries no `x-forwarded-proto`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_bind() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_scheme() -> String {
    "http".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            dist_dir: default_dist_dir(),
            content_dir: default_content_dir(),
            scheme: default_scheme(),
        }
    }
}

/// Find a config file in `start` or its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}
