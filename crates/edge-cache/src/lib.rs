//! Cache policy and response headers for server-rendered pages.
//!
//! This crate provides:
//! - `RouteCachePolicy` - No-store policy with vary rules
//! - `SsrHeadersBuilder` - ETag, CSP and diagnostic headers for rendered pages
//! - `html_response` / `redirect_response` - Final HTTP responses
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{html_response, SsrHeadersBuilder};
//! use edge_security::ContentHash;
//!
//! let headers = SsrHeadersBuilder::new()
//!     .content_hash(ContentHash::of_json_or_fallback(&content))
//!     .asset_source(assets.source)
//!     .build();
//! let response = html_response(html, headers)?;
//! ```

mod headers;
mod policy;

pub use headers::*;
pub use policy::*;
