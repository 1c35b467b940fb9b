//! Collaborator seams: content, metadata and the app renderer.

use std::sync::Arc;

use async_trait::async_trait;
use edge_html::PageMetadata;
use tokio::sync::OnceCell;
use url::Url;

/// Supplies the content a page renders from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch content for the page at `url`.
    async fn fetch_content(&self, url: &Url) -> anyhow::Result<serde_json::Value>;
}

/// Derives page metadata from content.
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    /// Generate metadata for the page at `url`.
    async fn generate(&self, url: &Url, content: &serde_json::Value) -> anyhow::Result<PageMetadata>;
}

/// Server renderer for the app markup.
#[async_trait]
pub trait AppRenderer: Send + Sync {
    /// Render the app for `url` to an HTML string.
    async fn render_to_string(&self, url: &Url, content: &serde_json::Value) -> anyhow::Result<String>;
}

/// Produces the server renderer on first use.
#[async_trait]
pub trait RendererLoader: Send + Sync {
    /// Load the renderer.
    async fn load(&self) -> anyhow::Result<Arc<dyn AppRenderer>>;
}

/// Load-once cache around a [`RendererLoader`].
///
/// The first successful load is kept for the life of the process. A failed
/// load leaves the cache empty so a later request can try again.
pub struct RendererCache {
    loader: Arc<dyn RendererLoader>,
    cell: OnceCell<Arc<dyn AppRenderer>>,
}

impl RendererCache {
    /// Create an empty cache.
    pub fn new(loader: Arc<dyn RendererLoader>) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    /// Create a cache that already holds `renderer`.
    pub fn preloaded(renderer: Arc<dyn AppRenderer>) -> Self {
        Self {
            loader: Arc::new(Preloaded(renderer.clone())),
            cell: OnceCell::new_with(Some(renderer)),
        }
    }

    /// Whether a renderer has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// The renderer, loading it if needed.
    pub async fn get(&self) -> anyhow::Result<Arc<dyn AppRenderer>> {
        let renderer = self
            .cell
            .get_or_try_init(|| async {
                tracing::debug!("loading server renderer");
                self.loader.load().await
            })
            .await?;
        Ok(renderer.clone())
    }
}

impl std::fmt::Debug for RendererCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererCache")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

struct Preloaded(Arc<dyn AppRenderer>);

#[async_trait]
impl RendererLoader for Preloaded {
    async fn load(&self) -> anyhow::Result<Arc<dyn AppRenderer>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    #[async_trait]
    impl AppRenderer for Echo {
        async fn render_to_string(&self, url: &Url, _content: &serde_json::Value) -> anyhow::Result<String> {
            Ok(format!("<p>{}</p>", url.path()))
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl RendererLoader for CountingLoader {
        async fn load(&self) -> anyhow::Result<Arc<dyn AppRenderer>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                anyhow::bail!("bundle missing");
            }
            Ok(Arc::new(Echo))
        }
    }

    fn loader(fail_first: bool) -> Arc<CountingLoader> {
        Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
            fail_first,
        })
    }

    #[tokio::test]
    async fn test_loads_once() {
        let loader = loader(false);
        let cache = RendererCache::new(loader.clone());
        assert!(!cache.is_loaded());

        let url = Url::parse("https://www.example.com/docs").unwrap();
        for _ in 0..3 {
            let renderer = cache.get().await.unwrap();
            let html = renderer.render_to_string(&url, &serde_json::Value::Null).await.unwrap();
            assert_eq!(html, "<p>/docs</p>");
        }

        assert!(cache.is_loaded());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = loader(true);
        let cache = RendererCache::new(loader.clone());

        assert!(cache.get().await.is_err());
        assert!(!cache.is_loaded());
        assert!(cache.get().await.is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_preloaded() {
        let cache = RendererCache::preloaded(Arc::new(Echo));
        assert!(cache.is_loaded());
        assert!(cache.get().await.is_ok());
    }
}
