//! JSON content files keyed by URL path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use edge_ssr::ContentSource;
use url::Url;

use crate::error::{ContentError, ContentResult};

/// File read for the site root.
pub const INDEX_FILE: &str = "index.json";

/// Content source reading `<root>/<path>.json`.
///
/// `/` maps to `index.json`; `/docs` maps to `docs.json`, then
/// `docs/index.json`.
#[derive(Debug, Clone)]
pub struct JsonContentSource {
    root: PathBuf,
}

impl JsonContentSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files tried for `path`, in order.
    pub fn candidates(&self, path: &str) -> ContentResult<Vec<PathBuf>> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(vec![self.root.join(INDEX_FILE)]);
        }

        let mut relative = PathBuf::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(ContentError::InvalidPath(path.to_string()));
            }
            relative.push(segment);
        }

        // Append rather than replace: `/v1.2` reads `v1.2.json`.
        let mut file = relative.clone().into_os_string();
        file.push(".json");

        Ok(vec![
            self.root.join(file),
            self.root.join(relative).join(INDEX_FILE),
        ])
    }

    /// Load the content for a URL path.
    pub async fn load(&self, path: &str) -> ContentResult<serde_json::Value> {
        for file in self.candidates(path)? {
            let bytes = match tokio::fs::read(&file).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ContentError::Io {
                        path: file.display().to_string(),
                        source: e,
                    })
                }
            };

            let value = serde_json::from_slice(&bytes).map_err(|e| ContentError::Parse {
                path: file.display().to_string(),
                source: e,
            })?;
            tracing::debug!(path, file = %file.display(), "content loaded");
            return Ok(value);
        }

        Err(ContentError::NotFound(path.to_string()))
    }
}

#[async_trait]
impl ContentSource for JsonContentSource {
    async fn fetch_content(&self, url: &Url) -> anyhow::Result<serde_json::Value> {
        Ok(self.load(url.path()).await?)
    }
}
