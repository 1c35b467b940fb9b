//! Core abstractions for the edge SSR shim.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `SiteConfig` - Immutable, environment-derived configuration
//! - `RequestContext` - Read-only view of an incoming request
//! - `TimingContext` - Elapsed time since the request arrived

mod config;
mod context;
mod timing;

pub use config::*;
pub use context::*;
pub use timing::*;
