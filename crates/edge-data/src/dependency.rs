//! Dependency tagging for outbound requests.

use std::time::Duration;

/// Categories of outbound dependency, each with a default timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Bundler asset manifest.
    Manifest,
    /// Built `index.html` scraped for asset tags.
    IndexHtml,
    /// Page content data.
    Content,
}

impl DependencyTag {
    /// Get the default timeout for this dependency type.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Manifest => Duration::from_millis(2000),
            Self::IndexHtml => Duration::from_millis(2000),
            Self::Content => Duration::from_millis(2500),
        }
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::IndexHtml => "index_html",
            Self::Content => "content",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        assert_eq!(DependencyTag::Manifest.default_timeout(), Duration::from_secs(2));
        assert_eq!(DependencyTag::IndexHtml.default_timeout(), Duration::from_secs(2));
        assert_eq!(DependencyTag::Content.default_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_names() {
        assert_eq!(DependencyTag::Manifest.name(), "manifest");
        assert_eq!(DependencyTag::IndexHtml.to_string(), "index_html");
        assert_eq!(DependencyTag::Content.to_string(), "content");
    }
}
