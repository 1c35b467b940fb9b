//! Shared doubles for handler tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edge_ssr::edge_data::{StubFetcher, StubReply};
use edge_ssr::edge_html::PageMetadata;
use edge_ssr::prelude::*;
use url::Url;

pub const DEPLOY_ORIGIN: &str = "https://deploy-42--site.netlify.app";

pub const MANIFEST: &str = r#"{
    "src/main.tsx": {"file": "assets/main-4f2c.js", "css": ["assets/main-9b1e.css"], "isEntry": true}
}"#;

/// How the content double answers.
#[derive(Clone)]
pub enum ContentMode {
    Ok(serde_json::Value),
    Fail,
    Hang,
}

pub struct TestContent {
    mode: ContentMode,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContentSource for TestContent {
    async fn fetch_content(&self, _url: &Url) -> anyhow::Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            ContentMode::Ok(value) => Ok(value.clone()),
            ContentMode::Fail => anyhow::bail!("content store unavailable"),
            ContentMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(serde_json::Value::Null)
            }
        }
    }
}

pub struct TestMetadata;

#[async_trait]
impl MetadataGenerator for TestMetadata {
    async fn generate(&self, url: &Url, content: &serde_json::Value) -> anyhow::Result<PageMetadata> {
        let title = content["title"].as_str().unwrap_or("Untitled");
        Ok(PageMetadata::new(title)
            .with_description("Rename Figma variants in bulk & more")
            .with_structured_data(serde_json::json!({
                "@context": "https://schema.org",
                "@type": "WebPage",
                "url": url.as_str(),
            })))
    }
}

pub struct TestRenderer {
    pub renders: AtomicUsize,
}

#[async_trait]
impl AppRenderer for TestRenderer {
    async fn render_to_string(&self, url: &Url, content: &serde_json::Value) -> anyhow::Result<String> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "<main data-path=\"{}\"><h1>{}</h1></main>",
            url.path(),
            content["title"].as_str().unwrap_or_default()
        ))
    }
}

pub struct TestLoader {
    pub renderer: Arc<TestRenderer>,
    pub loads: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl RendererLoader for TestLoader {
    async fn load(&self) -> anyhow::Result<Arc<dyn AppRenderer>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("server bundle not found");
        }
        Ok(self.renderer.clone())
    }
}

/// Handler plus handles on every double.
pub struct Harness {
    pub handler: SsrHandler,
    pub content: Arc<TestContent>,
    pub loader: Arc<TestLoader>,
    pub fetcher: Arc<StubFetcher>,
}

impl Harness {
    pub fn content_calls(&self) -> usize {
        self.content.calls.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> usize {
        self.loader.renderer.renders.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loader.loads.load(Ordering::SeqCst)
    }
}

pub struct HarnessBuilder {
    config: SiteConfig,
    content: ContentMode,
    fetcher: StubFetcher,
    renderer_fails: bool,
    options: RouteOptions,
    content_timeout: Option<Duration>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: SiteConfig::default()
                .with_allowed_hosts(&["example.com", "*.example.com"])
                .with_deploy_url(DEPLOY_ORIGIN)
                .with_analytics_id("G-TEST123"),
            content: ContentMode::Ok(serde_json::json!({
                "title": "Rename <Variants> & Props",
                "body": "</script><script>alert(1)</script>",
            })),
            fetcher: StubFetcher::new()
                .with_reply(format!("{}/manifest.json", DEPLOY_ORIGIN), StubReply::ok(MANIFEST)),
            renderer_fails: false,
            options: RouteOptions::default(),
            content_timeout: None,
        }
    }

    pub fn config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content(mut self, mode: ContentMode) -> Self {
        self.content = mode;
        self
    }

    pub fn fetcher(mut self, fetcher: StubFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn renderer_fails(mut self) -> Self {
        self.renderer_fails = true;
        self
    }

    pub fn render_dev_hosts(mut self) -> Self {
        self.options.render_dev_hosts = true;
        self
    }

    pub fn content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Harness {
        let content = Arc::new(TestContent {
            mode: self.content,
            calls: AtomicUsize::new(0),
        });
        let loader = Arc::new(TestLoader {
            renderer: Arc::new(TestRenderer {
                renders: AtomicUsize::new(0),
            }),
            loads: AtomicUsize::new(0),
            fail: self.renderer_fails,
        });
        let fetcher = Arc::new(self.fetcher);

        let collaborators = Collaborators {
            content: content.clone(),
            metadata: Arc::new(TestMetadata),
            renderer: Arc::new(RendererCache::new(loader.clone())),
        };

        let mut handler = SsrHandler::new(Arc::new(self.config), fetcher.clone(), collaborators)
            .with_route_options(self.options);
        if let Some(timeout) = self.content_timeout {
            handler = handler.with_content_timeout(timeout);
        }

        Harness {
            handler,
            content,
            loader,
            fetcher,
        }
    }
}

pub fn get(url: &str) -> RequestContext {
    RequestContext::new(Method::Get, url)
}

/// Header value as a string.
pub fn header<'a>(response: &'a http::Response<String>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Opening tags of every `<script>` without a `src` attribute, plus the dev client.
pub fn inline_script_tags(html: &str) -> Vec<&str> {
    html.split("<script")
        .skip(1)
        .filter_map(|rest| rest.find('>').map(|end| &rest[..end]))
        .filter(|open| !open.contains(" src=") || open.contains("/@vite/client"))
        .collect()
}

/// JSON assigned to `window.__SSR_DATA__`.
pub fn ssr_data_json(html: &str) -> &str {
    let marker = "window.__SSR_DATA__ = ";
    let start = html.find(marker).map(|i| i + marker.len()).unwrap_or(0);
    let end = html[start..].find(";</script>").map(|i| start + i).unwrap_or(start);
    &html[start..end]
}
