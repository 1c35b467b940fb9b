//! Tiered asset resolution.

use std::sync::Arc;
use std::time::Duration;

use edge_data::{DependencyTag, FetchError, FetchRequest, Fetcher};

use crate::fallback::{AssetSource, ResolvedAssets};
use crate::manifest::{AssetManifest, MANIFEST_PATHS};
use crate::scrape::{scrape_index_html, INDEX_HTML_PATH};

/// Network-backed tiers, attempted in this order.
const NETWORK_TIERS: [AssetSource; 2] = [AssetSource::Manifest, AssetSource::Index];

/// Resolver options.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Candidate manifest paths, primary first.
    pub manifest_paths: Vec<String>,
    /// Path of the built page for the index tier.
    pub index_path: String,
    /// Deadline for each manifest fetch.
    pub manifest_timeout: Duration,
    /// Deadline for the index fetch.
    pub index_timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            manifest_paths: MANIFEST_PATHS.iter().map(|p| p.to_string()).collect(),
            index_path: INDEX_HTML_PATH.to_string(),
            manifest_timeout: DependencyTag::Manifest.default_timeout(),
            index_timeout: DependencyTag::IndexHtml.default_timeout(),
        }
    }
}

/// Resolves bundle tags from the internal origin.
#[derive(Clone)]
pub struct AssetResolver {
    fetcher: Arc<dyn Fetcher>,
    options: ResolverOptions,
}

impl AssetResolver {
    /// Create a resolver with default options.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            options: ResolverOptions::default(),
        }
    }

    /// Override the options.
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve tags for a request.
    ///
    /// `origin` is the internal origin to fetch from (`scheme://host`).
    /// Never fails: the fallback tier always produces tags.
    pub async fn resolve(&self, origin: &str, is_production: bool) -> ResolvedAssets {
        if !is_production {
            return ResolvedAssets::dev();
        }

        let origin = origin.trim_end_matches('/');
        for tier in NETWORK_TIERS {
            if let Some(assets) = self.attempt(tier, origin).await {
                tracing::debug!(source = %assets.source, origin, "assets resolved");
                return assets;
            }
        }

        tracing::warn!(origin, "asset resolution fell back to default bundle path");
        ResolvedAssets::fallback()
    }

    async fn attempt(&self, tier: AssetSource, origin: &str) -> Option<ResolvedAssets> {
        match tier {
            AssetSource::Manifest => self.from_manifest(origin).await,
            AssetSource::Index => self.from_index(origin).await,
            AssetSource::Dev | AssetSource::Fallback => None,
        }
    }

    async fn from_manifest(&self, origin: &str) -> Option<ResolvedAssets> {
        for path in &self.options.manifest_paths {
            let url = format!("{}{}", origin, path);
            let request = FetchRequest::get(&url, DependencyTag::Manifest)
                .with_timeout(self.options.manifest_timeout)
                .skip_ssr();

            let body = match self.fetch_ok(request).await {
                Ok(body) => body,
                Err(e) => {
                    log_tier_failure("manifest", origin, path, &e);
                    continue;
                }
            };

            match AssetManifest::parse(&body).and_then(|m| m.to_assets()) {
                Ok(assets) => return Some(assets),
                Err(e) => {
                    tracing::warn!(tier = "manifest", origin, path = %path, error = %e, "manifest unusable");
                }
            }
        }
        None
    }

    async fn from_index(&self, origin: &str) -> Option<ResolvedAssets> {
        let path = &self.options.index_path;
        let url = format!("{}{}", origin, path);
        let request = FetchRequest::get(&url, DependencyTag::IndexHtml)
            .with_timeout(self.options.index_timeout)
            .skip_ssr();

        let body = match self.fetch_ok(request).await {
            Ok(body) => body,
            Err(e) => {
                log_tier_failure("index", origin, path, &e);
                return None;
            }
        };

        let html = String::from_utf8_lossy(&body);
        let assets = scrape_index_html(&html).into_assets();
        if assets.is_none() {
            tracing::warn!(tier = "index", origin, path = %path, "no module script found in index.html");
        }
        assets
    }

    async fn fetch_ok(&self, request: FetchRequest) -> Result<Vec<u8>, FetchError> {
        let url = request.url.clone();
        let response = self.fetcher.fetch(request).await?.error_for_status(&url)?;
        Ok(response.body)
    }
}

fn log_tier_failure(tier: &str, origin: &str, path: &str, error: &FetchError) {
    if error.is_timeout() {
        tracing::warn!(tier, origin, path, error = %error, "asset fetch timed out");
    } else {
        tracing::warn!(tier, origin, path, error = %error, "asset fetch failed");
    }
}
