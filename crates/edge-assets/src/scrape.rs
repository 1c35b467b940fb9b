//! Asset tag extraction from a built `index.html`.

use std::sync::OnceLock;

use regex::Regex;

use crate::fallback::{AssetSource, ResolvedAssets};

/// Path of the built page scraped by the index tier.
pub const INDEX_HTML_PATH: &str = "/index.html";

const STYLESHEET_PATTERN: &str = r#"(?is)<link\b[^>]*\brel\s*=\s*["']?stylesheet["']?[^>]*>"#;
const SCRIPT_OPEN_PATTERN: &str = r#"(?is)<script\b([^>]*)>"#;
const MODULE_TYPE_PATTERN: &str = r#"(?i)\btype\s*=\s*["']module["']"#;
const SRC_ATTR_PATTERN: &str = r#"(?i)\bsrc\s*=\s*["'][^"']+["']"#;

/// Compile `pattern` once. `None` makes the index tier miss.
fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern, error = %e, "index scrape pattern failed to compile");
            None
        }
    })
    .as_ref()
}

fn stylesheet_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, STYLESHEET_PATTERN)
}

fn script_open_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, SCRIPT_OPEN_PATTERN)
}

fn module_type_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, MODULE_TYPE_PATTERN)
}

fn src_attr_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, SRC_ATTR_PATTERN)
}

/// Tags found in a built page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedAssets {
    /// Every stylesheet link, verbatim.
    pub css_links: Vec<String>,
    /// First `<script type="module" src=...>` tag, closed.
    pub js_script_tag: Option<String>,
}

impl ScrapedAssets {
    /// Tags usable by the index tier; requires a module script.
    pub fn into_assets(self) -> Option<ResolvedAssets> {
        let js_script_tag = self.js_script_tag?;
        Some(ResolvedAssets {
            js_script_tag,
            css_links: self.css_links,
            source: AssetSource::Index,
        })
    }
}

/// Extract stylesheet links and the first module script from `html`.
pub fn scrape_index_html(html: &str) -> ScrapedAssets {
    let css_links = stylesheet_re()
        .map(|re| {
            re.find_iter(html)
                .map(|m| m.as_str().to_string())
                .collect()
        })
        .unwrap_or_default();

    let js_script_tag = match (script_open_re(), module_type_re(), src_attr_re()) {
        (Some(script_open), Some(module_type), Some(src_attr)) => script_open
            .captures_iter(html)
            .find(|caps| {
                let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                module_type.is_match(attrs) && src_attr.is_match(attrs)
            })
            .and_then(|caps| caps.get(0))
            .map(|open| format!("{}</script>", open.as_str())),
        _ => None,
    };

    ScrapedAssets {
        css_links,
        js_script_tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILT_INDEX: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" type="image/svg+xml" href="/favicon.svg" />
    <script>window.dataLayer = window.dataLayer || [];</script>
    <script type="module" crossorigin src="/assets/index-B7x2.js"></script>
    <script type="module" crossorigin src="/assets/second.js"></script>
    <link rel="modulepreload" crossorigin href="/assets/vendor-C1.js">
    <link rel="stylesheet" crossorigin href="/assets/index-D3.css">
    <link href="/assets/fonts.css" rel="stylesheet">
  </head>
  <body><div id="root"></div></body>
</html>"#;

    #[test]
    fn test_patterns_compile() {
        assert!(stylesheet_re().is_some());
        assert!(script_open_re().is_some());
        assert!(module_type_re().is_some());
        assert!(src_attr_re().is_some());
    }

    #[test]
    fn test_scrape_built_index() {
        let scraped = scrape_index_html(BUILT_INDEX);

        assert_eq!(
            scraped.css_links,
            vec![
                r#"<link rel="stylesheet" crossorigin href="/assets/index-D3.css">"#,
                r#"<link href="/assets/fonts.css" rel="stylesheet">"#,
            ]
        );
        assert_eq!(
            scraped.js_script_tag.as_deref(),
            Some(r#"<script type="module" crossorigin src="/assets/index-B7x2.js"></script>"#)
        );
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let scraped = scrape_index_html(r#"<SCRIPT src='/a.js' TYPE='module'></SCRIPT>"#);
        assert_eq!(
            scraped.js_script_tag.as_deref(),
            Some("<SCRIPT src='/a.js' TYPE='module'></script>")
        );
    }

    #[test]
    fn test_inline_and_classic_scripts_ignored() {
        let scraped = scrape_index_html(
            r#"<script type="module">import "/x.js"</script><script src="/legacy.js"></script>"#,
        );
        assert!(scraped.js_script_tag.is_none());
        assert!(scraped.clone().into_assets().is_none());
    }

    #[test]
    fn test_into_assets() {
        let assets = scrape_index_html(BUILT_INDEX).into_assets().unwrap();
        assert_eq!(assets.source, AssetSource::Index);
        assert_eq!(assets.css_links.len(), 2);
    }
}
