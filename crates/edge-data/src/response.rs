//! Fetched HTTP responses.

use std::collections::HashMap;

use crate::client::FetchError;

/// Status, headers and body of a completed fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Status code.
    pub status: u16,
    /// Headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Create a response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, FetchError> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| FetchError::Body(format!("invalid UTF-8: {}", e)))
    }

    /// Header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Keep 2xx responses; anything else becomes [`FetchError::Http`] for `url`.
    pub fn error_for_status(self, url: &str) -> Result<Self, FetchError> {
        if !self.is_success() {
            return Err(FetchError::Http {
                status: self.status,
                url: url.to_string(),
            });
        }
        Ok(self)
    }
}
