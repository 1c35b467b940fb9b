//! Content error types.

use thiserror::Error;

/// Errors that can occur when loading page content.
#[derive(Error, Debug)]
pub enum ContentError {
    /// No content file exists for the path.
    #[error("no content for {0}")]
    NotFound(String),

    /// The path cannot map to a file under the content root.
    #[error("invalid content path: {0}")]
    InvalidPath(String),

    /// Reading a content file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A content file is not valid JSON.
    #[error("malformed content in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
