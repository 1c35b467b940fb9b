//! In-memory fetcher for tests and offline tooling.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{FetchError, FetchRequest, Fetcher};
use crate::response::FetchResponse;

/// Canned outcome for a URL.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Respond with a status and body.
    Respond { status: u16, body: String },
    /// Fail as if the deadline expired.
    Timeout,
    /// Fail as if the connection was refused.
    Refused,
}

impl StubReply {
    /// 200 response with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Respond {
            status: 200,
            body: body.into(),
        }
    }

    /// Response with a status and empty body.
    pub fn status(status: u16) -> Self {
        Self::Respond {
            status,
            body: String::new(),
        }
    }
}

/// Fetcher answering from a URL table and recording every request.
///
/// Unknown URLs answer `404`.
#[derive(Debug, Default)]
pub struct StubFetcher {
    replies: HashMap<String, StubReply>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StubFetcher {
    /// Create an empty stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reply for a URL.
    pub fn with_reply(mut self, url: impl Into<String>, reply: StubReply) -> Self {
        self.replies.insert(url.into(), reply);
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    /// Whether `url` was requested.
    pub fn was_requested(&self, url: &str) -> bool {
        self.requests().iter().any(|r| r.url == url)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        match self.replies.get(&request.url) {
            Some(StubReply::Respond { status, body }) => Ok(FetchResponse::new(
                *status,
                HashMap::new(),
                body.clone().into_bytes(),
            )),
            Some(StubReply::Timeout) => Err(FetchError::Timeout {
                url: request.url,
                elapsed: request.timeout,
            }),
            Some(StubReply::Refused) => Err(FetchError::Connection {
                url: request.url,
                message: "connection refused".to_string(),
            }),
            None => Ok(FetchResponse::new(404, HashMap::new(), Vec::new())),
        }
    }
}

/// Fetcher that never answers within any deadline.
#[derive(Debug, Default)]
pub struct HangingFetcher;

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let limit = request.timeout;
        let hang = tokio::time::sleep(Duration::from_secs(3600));
        match crate::timeout::with_timeout(limit, hang).await {
            Ok(()) => Ok(FetchResponse::new(204, HashMap::new(), Vec::new())),
            Err(_) => Err(FetchError::Timeout {
                url: request.url,
                elapsed: limit,
            }),
        }
    }
}
