//! Content hashing for cache-busting ETags.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a content hash.
pub const CONTENT_HASH_BYTES: usize = 8;

/// Hash value used when the payload cannot be hashed.
pub const FALLBACK_HASH: &str = "fallback";

/// Errors while hashing a payload.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Truncated SHA-256 digest of a JSON-serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw bytes (first [`CONTENT_HASH_BYTES`] of the digest, hex-encoded).
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex_encode(&digest[..CONTENT_HASH_BYTES]))
    }

    /// Hash the JSON serialization of `value`.
    pub fn of_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, IntegrityError> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::of_bytes(&json))
    }

    /// Hash `value`, substituting [`FALLBACK_HASH`] on failure.
    pub fn of_json_or_fallback<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::of_json(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "content hash failed, using fallback");
            Self::fallback()
        })
    }

    /// The literal fallback hash.
    pub fn fallback() -> Self {
        Self(FALLBACK_HASH.to_string())
    }

    /// Whether this is the fallback value.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_HASH
    }

    /// Hash as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted ETag value.
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
