//! Static server markup for content pages.

use std::sync::Arc;

use async_trait::async_trait;
use edge_ssr::{AppRenderer, RendererLoader};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;
use url::Url;

/// Heading used for the FAQ section when the content has none.
pub const DEFAULT_FAQ_HEADING: &str = "Frequently asked questions";

/// Renders semantic markup from page content.
///
/// Understands `title`, `lead`, `sections[] {heading, body}` where `body` is a
/// string (blank lines split paragraphs) or an array of strings, and
/// `faq[] {question, answer}`. All text is escaped.
#[derive(Debug, Clone, Default)]
pub struct StaticMarkupRenderer;

impl StaticMarkupRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render the markup for `content` at `path`.
    pub fn render(&self, path: &str, content: &Value) -> String {
        let mut html = format!(
            r#"<main class="page" data-path="{}">"#,
            encode_double_quoted_attribute(path)
        );

        let title = field(content, "title");
        let lead = field(content, "lead");
        if title.is_some() || lead.is_some() {
            html.push_str("<header>");
            if let Some(title) = title {
                html.push_str(&format!("<h1>{}</h1>", encode_text(title)));
            }
            if let Some(lead) = lead {
                html.push_str(&format!(r#"<p class="lead">{}</p>"#, encode_text(lead)));
            }
            html.push_str("</header>");
        }

        for section in array(content, "sections") {
            html.push_str("<section>");
            if let Some(heading) = field(section, "heading") {
                html.push_str(&format!("<h2>{}</h2>", encode_text(heading)));
            }
            for paragraph in paragraphs(section.get("body")) {
                html.push_str(&format!("<p>{}</p>", encode_text(paragraph)));
            }
            html.push_str("</section>");
        }

        let faq: Vec<(&str, &str)> = array(content, "faq")
            .filter_map(|item| Some((field(item, "question")?, field(item, "answer")?)))
            .collect();
        if !faq.is_empty() {
            let heading = field(content, "faqHeading").unwrap_or(DEFAULT_FAQ_HEADING);
            html.push_str(&format!(
                r#"<section class="faq"><h2>{}</h2>"#,
                encode_text(heading)
            ));
            for (question, answer) in faq {
                html.push_str(&format!(
                    "<details><summary>{}</summary><p>{}</p></details>",
                    encode_text(question),
                    encode_text(answer)
                ));
            }
            html.push_str("</section>");
        }

        html.push_str("</main>");
        html
    }
}

#[async_trait]
impl AppRenderer for StaticMarkupRenderer {
    async fn render_to_string(&self, url: &Url, content: &Value) -> anyhow::Result<String> {
        Ok(self.render(url.path(), content))
    }
}

/// Loader handing out a [`StaticMarkupRenderer`].
#[derive(Debug, Clone, Default)]
pub struct StaticMarkupLoader;

#[async_trait]
impl RendererLoader for StaticMarkupLoader {
    async fn load(&self) -> anyhow::Result<Arc<dyn AppRenderer>> {
        tracing::info!("using static markup renderer");
        Ok(Arc::new(StaticMarkupRenderer::new()))
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str().filter(|s| !s.trim().is_empty())
}

fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn paragraphs(body: Option<&Value>) -> Vec<&str> {
    match body {
        Some(Value::String(text)) => text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
