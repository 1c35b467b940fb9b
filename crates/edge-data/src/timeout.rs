//! Deadline wrapper for async operations.

use std::future::Future;
use std::time::Duration;

/// Error when a deadline is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Run `fut` with a deadline.
///
/// On expiry the future is dropped, which cancels any in-flight request it owns.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TimeoutError(limit))
}
