//! Render pipeline errors.

use std::fmt;
use std::time::Duration;

use edge_html::HtmlError;
use edge_routing::BypassReason;

/// Error raised anywhere in the render pipeline.
///
/// Every variant results in delegation to the platform.
#[derive(Debug, thiserror::Error)]
pub enum SsrError {
    #[error("content fetch timed out after {0:?}")]
    ContentTimeout(Duration),

    #[error("content fetch failed: {0:#}")]
    Content(anyhow::Error),

    #[error("metadata generation failed: {0:#}")]
    Metadata(anyhow::Error),

    #[error("renderer unavailable: {0:#}")]
    RendererLoad(anyhow::Error),

    #[error("render failed: {0:#}")]
    Render(anyhow::Error),

    #[error(transparent)]
    Document(#[from] HtmlError),

    #[error("response build failed: {0}")]
    Response(#[from] http::Error),
}

impl SsrError {
    /// Stage of the pipeline that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ContentTimeout(_) | Self::Content(_) => "content",
            Self::Metadata(_) => "metadata",
            Self::RendererLoad(_) | Self::Render(_) => "render",
            Self::Document(_) => "document",
            Self::Response(_) => "response",
        }
    }
}

/// Result type for render operations.
pub type SsrResult<T> = Result<T, SsrError>;

/// Why the handler produced no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateReason {
    /// A routing rule handed the request back.
    Bypass(BypassReason),
    /// The render pipeline failed.
    Failed,
}

impl fmt::Display for DelegateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bypass(reason) => write!(f, "{}", reason),
            Self::Failed => f.write_str("render-failed"),
        }
    }
}
