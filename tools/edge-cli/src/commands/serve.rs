//! Local server: server rendering in front of the built SPA.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use edge_content::{JsonContentSource, SeoMetadataGenerator, StaticMarkupLoader};
use edge_core::RequestContext;
use edge_data::{Fetcher, HttpFetcher};
use edge_routing::RouteOptions;
use edge_ssr::{Collaborators, RendererCache, SsrHandler, SsrOutcome};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let server = &ctx.config.server;
    let bind = args.bind.unwrap_or_else(|| server.bind.clone());
    let dist = ctx.resolve_path(args.dist.as_deref().unwrap_or(&server.dist_dir));
    let content = ctx.resolve_path(args.content.as_deref().unwrap_or(&server.content_dir));

    if !dist.join("index.html").is_file() {
        ctx.output.warn(&format!(
            "{} has no index.html; delegated requests will 404",
            dist.display()
        ));
    }

    let site = Arc::new(ctx.site());
    if site.allowed_hosts.is_empty() && site.allowed_origins.is_empty() {
        ctx.output
            .warn("No allowed hosts configured; every host receives server-rendered pages");
    }

    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new().context("Failed to build HTTP client")?);
    let collaborators = Collaborators {
        content: Arc::new(JsonContentSource::new(&content)),
        metadata: Arc::new(SeoMetadataGenerator::from_config(&site)),
        renderer: Arc::new(RendererCache::new(Arc::new(StaticMarkupLoader))),
    };

    let mut handler = SsrHandler::new(site, fetcher, collaborators).with_route_options(RouteOptions {
        render_dev_hosts: args.dev_render,
    });
    if let Some(ms) = args.content_timeout_ms {
        handler = handler.with_content_timeout(Duration::from_millis(ms));
    }

    let app = router(Arc::new(handler), &dist, &server.scheme);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    ctx.output.success(&format!("Serving on http://{}", bind));
    ctx.output.kv("dist", &dist.display().to_string());
    ctx.output.kv("content", &content.display().to_string());
    tracing::info!(%bind, dist = %dist.display(), content = %content.display(), "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

#[derive(Clone)]
struct AppState {
    handler: Arc<SsrHandler>,
    spa: ServeDir<ServeFile>,
    scheme: Arc<str>,
}

/// Router sending every request through `handler`, delegating to files under `dist`.
///
/// Delegated requests that match no file get `index.html`.
pub fn router(handler: Arc<SsrHandler>, dist: &Path, scheme: &str) -> Router {
    let spa = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));

    Router::new()
        .fallback(render_or_delegate)
        .with_state(AppState {
            handler,
            spa,
            scheme: Arc::from(scheme),
        })
        .layer(TraceLayer::new_for_http())
}

async fn render_or_delegate(State(state): State<AppState>, req: Request) -> Response {
    let ctx = RequestContext::from_http(&req, &state.scheme);

    match state.handler.handle(&ctx).await {
        SsrOutcome::Respond(response) => response.into_response(),
        SsrOutcome::Delegate(reason) => {
            tracing::debug!(%reason, path = req.uri().path(), "serving from dist");
            match state.spa.oneshot(req).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
