//! Request routing for the edge SSR shim.
//!
//! This crate provides:
//! - `decide` - Ordered bypass/redirect/render decision for a request
//! - `pick_internal_origin` - Origin for self-fetches that avoids re-entering the shim
//! - Path helpers (`normalize_path`, `is_bypass_path`, `is_admin_path`)
//!
//! # Example
//!
//! ```ignore
//! use edge_routing::{decide, RouteDecision};
//!
//! match decide(&ctx, sanitized.as_ref()) {
//!     RouteDecision::Render { path } => render(path),
//!     RouteDecision::Redirect { location } => redirect(location),
//!     RouteDecision::Delegate(reason) => delegate(reason),
//! }
//! ```

mod decision;
mod origin;

pub use decision::*;
pub use origin::*;
