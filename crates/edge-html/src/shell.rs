//! Document shell assembly.

use edge_assets::ResolvedAssets;
use edge_core::SiteConfig;
use edge_security::CspNonce;

use crate::hydration::{to_script_json, HtmlError, HydrationPayload, SSR_DATA_GLOBAL};
use crate::metadata::PageMetadata;
use crate::snippets::{dev_preamble, instrumentation_snippets, scroll_guard, Placement, Snippet};

/// Id of the element the client app mounts on.
pub const ROOT_ELEMENT_ID: &str = "root";

/// Head content for the shell.
#[derive(Debug, Clone, Default)]
pub struct HeadContent {
    /// Page title (plain text, escaped on render).
    pub title: String,
    /// Meta description (plain text, escaped on render).
    pub description: String,
    /// Trusted head markup.
    pub meta_tags: String,
    /// JSON-LD structured data.
    pub structured_data: Option<serde_json::Value>,
    /// Link tags (stylesheets).
    pub links: Vec<String>,
    /// Head snippets.
    pub snippets: Vec<Snippet>,
}

impl HeadContent {
    /// Create head content from page metadata.
    pub fn from_metadata(metadata: &PageMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            meta_tags: metadata.meta_tags.clone(),
            structured_data: metadata.structured_data.clone(),
            ..Default::default()
        }
    }

    /// Add stylesheet link tags.
    pub fn with_links(mut self, links: &[String]) -> Self {
        self.links.extend_from_slice(links);
        self
    }

    /// Render head content to HTML.
    pub fn render(&self, nonce: &CspNonce) -> Result<String, HtmlError> {
        let mut html = String::new();

        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str(&format!(
            "<title>{}</title>\n",
            html_escape::encode_text(&self.title)
        ));
        if !self.description.is_empty() {
            html.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">\n",
                html_escape::encode_double_quoted_attribute(&self.description)
            ));
        }

        if !self.meta_tags.is_empty() {
            html.push_str(&self.meta_tags);
            html.push('\n');
        }

        if let Some(data) = &self.structured_data {
            html.push_str(&format!(
                "<script type=\"application/ld+json\" nonce=\"{}\">{}</script>\n",
                nonce.value(),
                to_script_json(data)?
            ));
        }

        for snippet in &self.snippets {
            html.push_str(&snippet.render(nonce));
            html.push('\n');
        }

        for link in &self.links {
            html.push_str(link);
            html.push('\n');
        }

        Ok(html)
    }
}

/// Full document around the server-rendered app markup.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Include doctype declaration.
    pub doctype: bool,
    /// Document language.
    pub lang: String,
    /// Head content.
    pub head: HeadContent,
    /// Server-rendered app markup placed in the root element.
    pub app_html: String,
    /// Script-safe hydration JSON.
    pub hydration_json: Option<String>,
    /// Snippets placed before `</body>`.
    pub body_snippets: Vec<Snippet>,
    /// Entry module script tag.
    pub entry_script: String,
}

impl Shell {
    /// Create a new shell.
    pub fn new(head: HeadContent) -> Self {
        Self {
            doctype: true,
            lang: "en".to_string(),
            head,
            app_html: String::new(),
            hydration_json: None,
            body_snippets: Vec::new(),
            entry_script: String::new(),
        }
    }

    /// Set the app markup.
    pub fn with_app_html(mut self, html: impl Into<String>) -> Self {
        self.app_html = html.into();
        self
    }

    /// Set the hydration payload.
    pub fn with_hydration(mut self, payload: &HydrationPayload<'_>) -> Result<Self, HtmlError> {
        self.hydration_json = Some(payload.to_script_json()?);
        Ok(self)
    }

    /// Set the entry module script tag.
    pub fn with_entry_script(mut self, tag: impl Into<String>) -> Self {
        self.entry_script = tag.into();
        self
    }

    /// Add a snippet at its placement.
    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        match snippet.placement {
            Placement::Head => self.head.snippets.push(snippet),
            Placement::BodyEnd => self.body_snippets.push(snippet),
        }
        self
    }

    /// Render the document.
    pub fn render(&self, nonce: &CspNonce) -> Result<String, HtmlError> {
        let mut html = String::new();

        if self.doctype {
            html.push_str("<!DOCTYPE html>\n");
        }

        html.push_str(&format!(
            "<html lang=\"{}\">\n<head>\n",
            html_escape::encode_double_quoted_attribute(&self.lang)
        ));
        html.push_str(&self.head.render(nonce)?);
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<div id=\"{}\">{}</div>\n",
            ROOT_ELEMENT_ID, self.app_html
        ));

        if let Some(json) = &self.hydration_json {
            html.push_str(&format!(
                "<script nonce=\"{}\">{} = {};</script>\n",
                nonce.value(),
                SSR_DATA_GLOBAL,
                json
            ));
        }

        if !self.entry_script.is_empty() {
            html.push_str(&self.entry_script);
            html.push('\n');
        }

        for snippet in &self.body_snippets {
            html.push_str(&snippet.render(nonce));
            html.push('\n');
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

/// Everything needed to assemble a page.
#[derive(Debug)]
pub struct DocumentInput<'a> {
    /// Per-response nonce.
    pub nonce: &'a CspNonce,
    /// Page metadata.
    pub metadata: &'a PageMetadata,
    /// Resolved bundle tags.
    pub assets: &'a ResolvedAssets,
    /// Server-rendered app markup.
    pub app_html: &'a str,
    /// Content the page was rendered from.
    pub content_data: &'a serde_json::Value,
    /// Canonical page URL.
    pub canonical_url: &'a str,
    /// Whether the request host is a production host.
    pub is_production: bool,
    /// Whether the path is in the admin area.
    pub is_admin_path: bool,
    /// Site configuration.
    pub config: &'a SiteConfig,
}

/// Assemble the full HTML document for a rendered page.
pub fn assemble_document(input: &DocumentInput<'_>) -> Result<String, HtmlError> {
    let head = HeadContent::from_metadata(input.metadata).with_links(&input.assets.css_links);

    let mut shell = Shell::new(head)
        .with_app_html(input.app_html)
        .with_hydration(&HydrationPayload::new(
            input.content_data,
            input.canonical_url,
        ))?
        .with_entry_script(input.assets.js_script_tag.as_str())
        .with_snippet(scroll_guard());

    for snippet in instrumentation_snippets(input.is_production, input.is_admin_path, input.config)
    {
        shell = shell.with_snippet(snippet);
    }

    if let Some(preamble) = dev_preamble(input.is_production) {
        shell = shell.with_snippet(preamble);
    }

    shell.render(input.nonce)
}
