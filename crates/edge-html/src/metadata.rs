//! Page metadata emitted into the document head.

use serde::{Deserialize, Serialize};

/// Metadata for a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title (plain text).
    pub title: String,
    /// Meta description (plain text).
    #[serde(default)]
    pub description: String,
    /// Additional head markup, emitted as is.
    #[serde(default)]
    pub meta_tags: String,
    /// JSON-LD structured data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Value>,
}

impl PageMetadata {
    /// Create metadata with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append trusted head markup.
    pub fn with_meta_tags(mut self, markup: impl AsRef<str>) -> Self {
        if !self.meta_tags.is_empty() {
            self.meta_tags.push('\n');
        }
        self.meta_tags.push_str(markup.as_ref());
        self
    }

    /// Set structured data.
    pub fn with_structured_data(mut self, data: serde_json::Value) -> Self {
        self.structured_data = Some(data);
        self
    }
}
