//! Security infrastructure for the edge SSR shim.
//!
//! This crate provides:
//! - `HostAllowlist` - Environment-derived host allow-list and request URL sanitizing
//! - `CspNonce` / `ContentSecurityPolicy` - Per-response nonce and nonce-scoped CSP
//! - `ContentHash` - Truncated SHA-256 digest used as an ETag
//!
//! # Example
//!
//! ```ignore
//! use edge_security::{HostAllowlist, CspNonce, ContentSecurityPolicy};
//!
//! let allowlist = HostAllowlist::new()
//!     .allow("example.com")
//!     .allow("*.example.com");
//!
//! let url = allowlist.sanitize_request_url("https://www.example.com/docs#top");
//!
//! let nonce = CspNonce::generate();
//! let csp = ContentSecurityPolicy::for_ssr(&nonce, true).header_value();
//! ```

mod allowlist;
mod csp;
mod integrity;

pub use allowlist::*;
pub use csp::*;
pub use integrity::*;
