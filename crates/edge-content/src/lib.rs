//! File-backed page collaborators for the edge SSR shim.
//!
//! This crate provides:
//! - `JsonContentSource`: page content read from a directory of JSON files
//! - `SeoMetadataGenerator`: titles, Open Graph and Twitter tags, JSON-LD
//! - `StaticMarkupRenderer`: semantic server markup built from the content
//! - `StaticMarkupLoader`: hands the renderer to the handler's load-once cache

mod error;
mod markup;
mod seo;
mod source;

pub use error::*;
pub use markup::*;
pub use seo::*;
pub use source::*;
