//! Outbound fetch client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use edge_core::SKIP_SSR_HEADER;

use crate::dependency::DependencyTag;
use crate::response::FetchResponse;
use crate::timeout::{with_timeout, TimeoutError};

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout after {elapsed:?} for {url}")]
    Timeout { url: String, elapsed: Duration },

    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Body error: {0}")]
    Body(String),

    #[error("Client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether the request was abandoned because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// An outbound GET request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Absolute URL.
    pub url: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Deadline for the whole request, body included.
    pub timeout: Duration,
    /// Dependency category, used for logging.
    pub tag: DependencyTag,
}

impl FetchRequest {
    /// Create a GET request with the tag's default timeout.
    pub fn get(url: impl Into<String>, tag: DependencyTag) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: tag.default_timeout(),
            tag,
        }
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mark the request so it does not re-enter the SSR handler.
    pub fn skip_ssr(self) -> Self {
        self.with_header(SKIP_SSR_HEADER, "1")
    }

    /// Whether the request carries the skip-SSR marker.
    pub fn is_skip_ssr(&self) -> bool {
        self.headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(SKIP_SSR_HEADER))
    }
}

/// Outbound GET requests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request. Non-2xx statuses are returned, not raised.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("edge-ssr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let send = async {
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let headers: HashMap<String, String> = resp
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(FetchResponse::new(status, headers, body.to_vec()))
        };

        match with_timeout(request.timeout, send).await {
            Ok(Ok(resp)) => {
                tracing::debug!(
                    dependency = %request.tag,
                    url = %request.url,
                    status = resp.status,
                    "fetch completed"
                );
                Ok(resp)
            }
            Ok(Err(e)) => Err(FetchError::Connection {
                url: request.url,
                message: e.to_string(),
            }),
            Err(TimeoutError(elapsed)) => Err(FetchError::Timeout {
                url: request.url,
                elapsed,
            }),
        }
    }
}
