//! Asset sources, tag builders and the hardcoded defaults.

use std::fmt;

use serde::Serialize;

/// Dev-server entry module.
pub const DEV_ENTRY: &str = "/src/main.tsx";

/// Bundle path used when nothing else resolved.
pub const FALLBACK_JS: &str = "/assets/index.js";

/// Which tier produced the asset tags.
///
/// Only surfaced as a diagnostic response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    /// Dev entry point on a non-production host.
    Dev,
    /// Bundler manifest.
    Manifest,
    /// Scraped from the built `index.html`.
    Index,
    /// Hardcoded default.
    Fallback,
}

impl AssetSource {
    /// Header value for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Manifest => "manifest",
            Self::Index => "index",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved bundle tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAssets {
    /// Module script tag for the entry chunk.
    pub js_script_tag: String,
    /// Stylesheet link tags.
    pub css_links: Vec<String>,
    /// Tier that produced these tags.
    pub source: AssetSource,
}

impl ResolvedAssets {
    /// Assets for a development host.
    pub fn dev() -> Self {
        Self {
            js_script_tag: module_script_tag(DEV_ENTRY),
            css_links: Vec::new(),
            source: AssetSource::Dev,
        }
    }

    /// Assets when every other tier failed.
    pub fn fallback() -> Self {
        Self {
            js_script_tag: module_script_tag(FALLBACK_JS),
            css_links: Vec::new(),
            source: AssetSource::Fallback,
        }
    }

    /// Stylesheet links joined for the document head.
    pub fn css_html(&self) -> String {
        self.css_links.join("\n")
    }
}

/// Prefix `path` with `/` unless it is already absolute or a full URL.
pub fn root_relative(path: &str) -> String {
    if path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// `<script type="module" crossorigin src="...">`.
pub fn module_script_tag(src: &str) -> String {
    format!(
        r#"<script type="module" crossorigin src="{}"></script>"#,
        html_escape::encode_double_quoted_attribute(&root_relative(src))
    )
}

/// `<link rel="stylesheet" crossorigin href="...">`.
pub fn stylesheet_tag(href: &str) -> String {
    format!(
        r#"<link rel="stylesheet" crossorigin href="{}">"#,
        html_escape::encode_double_quoted_attribute(&root_relative(href))
    )
}
