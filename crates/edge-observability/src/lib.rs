//! Observability for the edge SSR shim.
//!
//! This crate provides:
//! - `init_logging` - Global `tracing` subscriber (JSON or human output)
//! - `request_span` / `record_outcome` - One span per request
//! - `TraceContext` - W3C traceparent propagation into the span

mod logging;
mod span;

pub use logging::*;
pub use span::*;

// Re-export RequestId and TimingContext from edge-core for convenience
pub use edge_core::{RequestId, TimingContext};
