//! Outbound fetch layer with dependency tagging and timeouts.
//!
//! This crate provides:
//! - `Fetcher` - Async trait for outbound GET requests
//! - `HttpFetcher` - `reqwest`-backed implementation with per-request timeouts
//! - `DependencyTag` - Semantic dependency categories with default timeouts
//! - `with_timeout` - Bound any future by a deadline
//! - `StubFetcher` - In-memory fetcher for tests and offline tooling

mod client;
mod dependency;
mod response;
mod stub;
mod timeout;

pub use client::*;
pub use dependency::*;
pub use response::*;
pub use stub::*;
pub use timeout::*;
