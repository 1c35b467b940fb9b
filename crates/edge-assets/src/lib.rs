//! Asset resolution for the client bundle.
//!
//! Produces the `<link rel="stylesheet">` and `<script type="module">` tags
//! needed to boot the SPA, trying each source in order:
//!
//! 1. `dev` - fixed dev entry point (non-production hosts, no fetch)
//! 2. `manifest` - bundler manifest from the internal origin
//! 3. `index` - tags scraped from the built `index.html`
//! 4. `fallback` - hardcoded default bundle path
//!
//! A failing tier never aborts resolution; it only hands over to the next one.

mod fallback;
mod manifest;
mod resolver;
mod scrape;

pub use fallback::*;
pub use manifest::*;
pub use resolver::*;
pub use scrape::*;
