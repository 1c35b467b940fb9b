//! SEO metadata derived from page content.

use async_trait::async_trait;
use edge_core::SiteConfig;
use edge_html::PageMetadata;
use edge_ssr::MetadataGenerator;
use html_escape::encode_double_quoted_attribute as attr;
use serde_json::{json, Value};
use url::Url;

/// Builds page metadata from the `seo` block of the content.
///
/// Reads `seo.title` (or `title`), `seo.description` (or `description`),
/// `seo.image` and `seo.noindex`.
#[derive(Debug, Clone)]
pub struct SeoMetadataGenerator {
    site_name: String,
    default_image: Option<String>,
}

impl SeoMetadataGenerator {
    /// Create a generator for `site_name`.
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            default_image: None,
        }
    }

    /// Create a generator from the site configuration.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.site_name.clone())
    }

    /// Image used when the page has none.
    pub fn with_default_image(mut self, image: impl Into<String>) -> Self {
        self.default_image = Some(image.into());
        self
    }

    /// Build metadata for `content` served at `url`.
    pub fn build(&self, url: &Url, content: &Value) -> PageMetadata {
        let seo = content.get("seo");
        let page_title = text(seo, "title").or_else(|| text(Some(content), "title"));
        let title = match page_title {
            Some(t) if t != self.site_name => format!("{} | {}", t, self.site_name),
            _ => self.site_name.clone(),
        };
        let description = text(seo, "description")
            .or_else(|| text(Some(content), "description"))
            .unwrap_or_default();
        let image = text(seo, "image")
            .or(self.default_image.as_deref())
            .map(|image| absolute(url, image));
        let noindex = seo
            .and_then(|s| s.get("noindex"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let canonical = canonical_url(url);
        let mut tags = vec![format!(r#"<link rel="canonical" href="{}">"#, attr(&canonical))];
        if noindex {
            tags.push(r#"<meta name="robots" content="noindex, nofollow">"#.to_string());
        }
        tags.push(meta_property("og:type", "website"));
        tags.push(meta_property("og:site_name", &self.site_name));
        tags.push(meta_property("og:title", &title));
        tags.push(meta_property("og:url", &canonical));
        if !description.is_empty() {
            tags.push(meta_property("og:description", description));
        }
        let card = if image.is_some() { "summary_large_image" } else { "summary" };
        tags.push(meta_name("twitter:card", card));
        tags.push(meta_name("twitter:title", &title));
        if !description.is_empty() {
            tags.push(meta_name("twitter:description", description));
        }
        if let Some(image) = &image {
            tags.push(meta_property("og:image", image));
            tags.push(meta_name("twitter:image", image));
        }

        PageMetadata::new(title.clone())
            .with_description(description)
            .with_meta_tags(tags.join("\n"))
            .with_structured_data(self.structured_data(&title, description, &canonical, content))
    }

    fn structured_data(&self, title: &str, description: &str, canonical: &str, content: &Value) -> Value {
        let page = json!({
            "@type": "WebPage",
            "name": title,
            "description": description,
            "url": canonical,
            "isPartOf": {"@type": "WebSite", "name": self.site_name},
        });

        let questions: Vec<Value> = content
            .get("faq")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let question = item.get("question")?.as_str()?;
                        let answer = item.get("answer")?.as_str()?;
                        Some(json!({
                            "@type": "Question",
                            "name": question,
                            "acceptedAnswer": {"@type": "Answer", "text": answer},
                        }))
                    })
                    .collect()
            })
            .unwrap_or_default();

        if questions.is_empty() {
            let mut page = page;
            page["@context"] = json!("https://schema.org");
            return page;
        }

        json!({
            "@context": "https://schema.org",
            "@graph": [page, {"@type": "FAQPage", "mainEntity": questions}],
        })
    }
}

#[async_trait]
impl MetadataGenerator for SeoMetadataGenerator {
    async fn generate(&self, url: &Url, content: &Value) -> anyhow::Result<PageMetadata> {
        Ok(self.build(url, content))
    }
}

fn text<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Page URL without query or fragment, trailing slash removed except at the root.
fn canonical_url(url: &Url) -> String {
    let path = url.path();
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    let path = if path.is_empty() { "/" } else { path };
    format!("{}{}", url.origin().ascii_serialization(), path)
}

fn absolute(url: &Url, image: &str) -> String {
    url.join(image)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| image.to_string())
}

fn meta_property(property: &str, content: &str) -> String {
    format!(r#"<meta property="{}" content="{}">"#, property, attr(content))
}

fn meta_name(name: &str, content: &str) -> String {
    format!(r#"<meta name="{}" content="{}">"#, name, attr(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn generator() -> SeoMetadataGenerator {
        SeoMetadataGenerator::new("Variant Renamer")
    }

    // === Title Tests ===

    #[test]
    fn test_seo_title_preferred() {
        let content = json!({"title": "Docs", "seo": {"title": "Documentation"}});
        let meta = generator().build(&url("https://www.example.com/docs"), &content);
        assert_eq!(meta.title, "Documentation | Variant Renamer");
    }

    #[test]
    fn test_title_falls_back_to_site_name() {
        let meta = generator().build(&url("https://www.example.com/"), &json!({}));
        assert_eq!(meta.title, "Variant Renamer");

        let meta = generator().build(&url("https://www.example.com/"), &json!({"title": "  "}));
        assert_eq!(meta.title, "Variant Renamer");
    }

    // === Tag Tests ===

    #[test]
    fn test_canonical_strips_query_and_slash() {
        let meta = generator().build(&url("https://www.example.com/docs/?ref=x#top"), &json!({}));
        assert!(meta
            .meta_tags
            .contains(r#"<link rel="canonical" href="https://www.example.com/docs">"#));
    }

    #[test]
    fn test_open_graph_and_twitter() {
        let content = json!({
            "seo": {"description": "Bulk \"rename\" <variants>", "image": "/og/docs.png"}
        });
        let meta = generator().build(&url("https://www.example.com/docs"), &content);

        assert_eq!(meta.description, "Bulk \"rename\" <variants>");
        assert!(meta.meta_tags.contains(
            r#"<meta property="og:description" content="Bulk &quot;rename&quot; &lt;variants&gt;">"#
        ));
        assert!(meta
            .meta_tags
            .contains(r#"<meta property="og:image" content="https://www.example.com/og/docs.png">"#));
        assert!(meta
            .meta_tags
            .contains(r#"<meta name="twitter:card" content="summary_large_image">"#));
        assert!(!meta.meta_tags.contains("robots"));
    }

    #[test]
    fn test_noindex() {
        let content = json!({"seo": {"noindex": true}});
        let meta = generator().build(&url("https://www.example.com/draft"), &content);
        assert!(meta.meta_tags.contains(r#"content="noindex, nofollow""#));
        assert!(meta.meta_tags.contains(r#"content="summary""#));
    }

    #[test]
    fn test_default_image() {
        let meta = generator()
            .with_default_image("https://cdn.example.com/og.png")
            .build(&url("https://www.example.com/"), &json!({}));
        assert!(meta.meta_tags.contains("https://cdn.example.com/og.png"));
    }

    // === Structured Data Tests ===

    #[test]
    fn test_web_page_structured_data() {
        let meta = generator().build(&url("https://www.example.com/pricing"), &json!({"title": "Pricing"}));
        let data = meta.structured_data.unwrap();
        assert_eq!(data["@context"], "https://schema.org");
        assert_eq!(data["@type"], "WebPage");
        assert_eq!(data["url"], "https://www.example.com/pricing");
        assert_eq!(data["isPartOf"]["name"], "Variant Renamer");
    }

    #[test]
    fn test_faq_structured_data() {
        let content = json!({
            "faq": [
                {"question": "Is it free?", "answer": "Yes."},
                {"question": "incomplete"}
            ]
        });
        let meta = generator().build(&url("https://www.example.com/"), &content);
        let data = meta.structured_data.unwrap();
        let graph = data["@graph"].as_array().unwrap();
        assert_eq!(graph[1]["@type"], "FAQPage");
        assert_eq!(graph[1]["mainEntity"].as_array().unwrap().len(), 1);
        assert_eq!(graph[1]["mainEntity"][0]["acceptedAnswer"]["text"], "Yes.");
    }
}
