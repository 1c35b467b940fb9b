//! Edge server-rendering shim for the marketing site.
//!
//! The handler sanitizes the request origin, decides between delegating,
//! redirecting and rendering, then assembles a page from the content,
//! metadata and renderer collaborators. Any failure delegates to the
//! platform's SPA delivery.
//!
//! ```ignore
//! use edge_ssr::prelude::*;
//!
//! let handler = SsrHandler::new(Arc::new(SiteConfig::from_env()), fetcher, collaborators);
//!
//! match handler.handle(&RequestContext::from_http(&req, "https")).await {
//!     SsrOutcome::Respond(response) => response,
//!     SsrOutcome::Delegate(reason) => serve_spa(req, reason).await,
//! }
//! ```

mod collaborators;
mod error;
mod handler;

pub use collaborators::*;
pub use error::*;
pub use handler::*;

pub use edge_assets;
pub use edge_cache;
pub use edge_core;
pub use edge_data;
pub use edge_html;
pub use edge_observability;
pub use edge_routing;
pub use edge_security;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AppRenderer, Collaborators, ContentSource, DelegateReason, MetadataGenerator,
        RendererCache, RendererLoader, SsrError, SsrHandler, SsrOutcome,
    };
    pub use edge_assets::{AssetResolver, AssetSource, ResolvedAssets};
    pub use edge_core::{Method, RequestContext, SiteConfig};
    pub use edge_data::{Fetcher, HttpFetcher};
    pub use edge_html::PageMetadata;
    pub use edge_routing::{BypassReason, RouteDecision, RouteOptions};
    pub use std::sync::Arc;
}
