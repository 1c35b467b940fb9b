//! Trace context and per-request spans.

use edge_core::{RequestContext, RequestId};
use tracing::field::Empty;

/// Incoming W3C trace context header.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Trace context for distributed tracing.
///
/// Compatible with W3C Trace Context format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// The trace ID (128-bit, hex encoded).
    pub trace_id: String,
    /// The parent span ID (64-bit, hex encoded).
    pub parent_span_id: Option<String>,
    /// Whether this trace is sampled.
    pub sampled: bool,
}

impl TraceContext {
    /// Root context keyed by a request ID.
    pub fn from_request_id(request_id: &RequestId) -> Self {
        Self {
            trace_id: request_id.0.clone(),
            parent_span_id: None,
            sampled: true,
        }
    }

    /// Parse from W3C traceparent header.
    ///
    /// Format: `{version}-{trace_id}-{span_id}-{flags}`
    /// Example: `00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        let [version, trace_id, span_id, flags] = parts.as_slice() else {
            return None;
        };

        if *version != "00" || !is_hex_of_len(trace_id, 32) || !is_hex_of_len(span_id, 16) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            parent_span_id: Some(span_id.to_ascii_lowercase()),
            sampled: flags & 0x01 != 0,
        })
    }

    /// Context from the request's traceparent, or a root keyed by its ID.
    pub fn for_request(ctx: &RequestContext) -> Self {
        ctx.header(TRACEPARENT_HEADER)
            .and_then(Self::from_traceparent)
            .unwrap_or_else(|| Self::from_request_id(&ctx.request_id))
    }
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Span covering one request through the shim.
///
/// `decision`, `assets`, `status` and `elapsed_ms` start empty and are
/// recorded as the request progresses.
pub fn request_span(ctx: &RequestContext) -> tracing::Span {
    let trace = TraceContext::for_request(ctx);
    tracing::info_span!(
        "ssr_request",
        request_id = %ctx.request_id,
        trace_id = %trace.trace_id,
        method = ctx.method.as_str(),
        url = %ctx.url,
        decision = Empty,
        assets = Empty,
        status = Empty,
        elapsed_ms = Empty,
    )
}

/// Record how a request finished on its span.
pub fn record_outcome(span: &tracing::Span, ctx: &RequestContext, status: &str) {
    span.record("status", status);
    span.record("elapsed_ms", ctx.timing.elapsed_ms());
}
