//! HTML document assembly for server-rendered pages.
//!
//! This crate provides:
//! - `Shell` / `HeadContent` - Document template around the app markup
//! - `HydrationPayload` - Script-safe `window.__SSR_DATA__` payload
//! - Snippet gates - Consent, analytics, tracking, scroll guard and dev preamble
//! - `assemble_document` - The full page with every inline script under one nonce

mod hydration;
mod metadata;
mod shell;
mod snippets;

pub use hydration::*;
pub use metadata::*;
pub use shell::*;
pub use snippets::*;
