//! Bundler manifest parsing.

use std::collections::HashMap;

use serde::Deserialize;

use crate::fallback::{module_script_tag, stylesheet_tag, AssetSource, ResolvedAssets};

/// Candidate manifest paths, primary first.
pub const MANIFEST_PATHS: &[&str] = &["/manifest.json", "/.vite/manifest.json"];

/// Manifest key of the client entry module.
pub const CLIENT_ENTRY_KEY: &str = "src/main.tsx";

/// Manifest key used when the entry is the HTML page itself.
pub const INDEX_ENTRY_KEY: &str = "index.html";

/// Errors while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest has no entry (looked for {0:?})")]
    MissingEntry(Vec<String>),
}

/// One manifest chunk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestChunk {
    /// Emitted file, relative to the build root.
    pub file: String,
    /// Emitted stylesheets for this chunk.
    #[serde(default)]
    pub css: Vec<String>,
    /// Source path.
    #[serde(default)]
    pub src: Option<String>,
    /// Whether the chunk is an entry point.
    #[serde(default, rename = "isEntry")]
    pub is_entry: bool,
}

/// Parsed manifest: `{ "<entry>": { "file": ..., "css": [...] } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    chunks: HashMap<String, ManifestChunk>,
}

impl AssetManifest {
    /// Parse a manifest document.
    pub fn parse(bytes: &[u8]) -> Result<Self, AssetError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Look up a chunk by key.
    pub fn chunk(&self, key: &str) -> Option<&ManifestChunk> {
        self.chunks.get(key)
    }

    /// The client entry, falling back to the `index.html` entry.
    pub fn entry(&self) -> Result<&ManifestChunk, AssetError> {
        self.chunk(CLIENT_ENTRY_KEY)
            .or_else(|| self.chunk(INDEX_ENTRY_KEY))
            .ok_or_else(|| {
                AssetError::MissingEntry(vec![
                    CLIENT_ENTRY_KEY.to_string(),
                    INDEX_ENTRY_KEY.to_string(),
                ])
            })
    }

    /// Build tags from the entry chunk.
    pub fn to_assets(&self) -> Result<ResolvedAssets, AssetError> {
        let entry = self.entry()?;
        Ok(ResolvedAssets {
            js_script_tag: module_script_tag(&entry.file),
            css_links: entry.css.iter().map(|href| stylesheet_tag(href)).collect(),
            source: AssetSource::Manifest,
        })
    }
}
