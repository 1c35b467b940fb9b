//! Top-level request handler.

use std::sync::Arc;
use std::time::Duration;

use edge_assets::AssetResolver;
use edge_cache::{html_response, redirect_response, SsrHeadersBuilder};
use edge_core::{Method, RequestContext, SiteConfig};
use edge_data::{with_timeout, DependencyTag, Fetcher};
use edge_html::{assemble_document, DocumentInput};
use edge_observability::{record_outcome, request_span};
use edge_routing::{decide_with, is_admin_path, pick_internal_origin, BypassReason, RouteDecision, RouteOptions};
use edge_security::{ContentHash, ContentSecurityPolicy, CspNonce, HostAllowlist, SanitizedUrl};
use http::Response;
use tracing::Instrument;

use crate::collaborators::{ContentSource, MetadataGenerator, RendererCache};
use crate::error::{DelegateReason, SsrError, SsrResult};

/// Result of handling a request.
#[derive(Debug)]
pub enum SsrOutcome {
    /// Send this response.
    Respond(Response<String>),
    /// Let the platform serve the request (SPA delivery).
    Delegate(DelegateReason),
}

impl SsrOutcome {
    /// Whether the platform should serve the request.
    pub fn is_delegate(&self) -> bool {
        matches!(self, Self::Delegate(_))
    }

    /// The response, if any.
    pub fn response(&self) -> Option<&Response<String>> {
        match self {
            Self::Respond(response) => Some(response),
            Self::Delegate(_) => None,
        }
    }
}

/// Page collaborators.
#[derive(Clone)]
pub struct Collaborators {
    /// Content source.
    pub content: Arc<dyn ContentSource>,
    /// Metadata generator.
    pub metadata: Arc<dyn MetadataGenerator>,
    /// Load-once renderer.
    pub renderer: Arc<RendererCache>,
}

/// Server-rendering shim in front of the SPA.
///
/// Built once at startup and shared across requests.
pub struct SsrHandler {
    config: Arc<SiteConfig>,
    allowlist: HostAllowlist,
    assets: AssetResolver,
    collaborators: Collaborators,
    route_options: RouteOptions,
    content_timeout: Duration,
}

impl SsrHandler {
    /// Create a handler.
    pub fn new(config: Arc<SiteConfig>, fetcher: Arc<dyn Fetcher>, collaborators: Collaborators) -> Self {
        Self {
            allowlist: HostAllowlist::from_config(&config),
            assets: AssetResolver::new(fetcher),
            config,
            collaborators,
            route_options: RouteOptions::default(),
            content_timeout: DependencyTag::Content.default_timeout(),
        }
    }

    /// Replace the asset resolver.
    pub fn with_asset_resolver(mut self, resolver: AssetResolver) -> Self {
        self.assets = resolver;
        self
    }

    /// Set routing switches.
    pub fn with_route_options(mut self, options: RouteOptions) -> Self {
        self.route_options = options;
        self
    }

    /// Set the content fetch deadline.
    pub fn with_content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = timeout;
        self
    }

    /// Site configuration.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Host allow-list built from the configuration.
    pub fn allowlist(&self) -> &HostAllowlist {
        &self.allowlist
    }

    /// Routing decision for a request, without rendering.
    pub fn route(&self, ctx: &RequestContext) -> RouteDecision {
        self.route_with_url(ctx).0
    }

    fn route_with_url(&self, ctx: &RequestContext) -> (RouteDecision, Option<SanitizedUrl>) {
        let sanitized = self.allowlist.sanitize_request_url(&ctx.url);
        if sanitized.is_none() {
            tracing::debug!(url = %ctx.url, "request origin not allowed");
        }
        let decision = decide_with(ctx, sanitized.as_ref(), &self.route_options);
        (decision, sanitized)
    }

    /// Handle a request.
    ///
    /// Never fails: any error in the pipeline delegates to the platform.
    pub async fn handle(&self, ctx: &RequestContext) -> SsrOutcome {
        let span = request_span(ctx);
        let outcome = self.handle_inner(ctx).instrument(span.clone()).await;

        let status = match &outcome {
            SsrOutcome::Respond(response) => response.status().as_u16().to_string(),
            SsrOutcome::Delegate(_) => "delegate".to_string(),
        };
        record_outcome(&span, ctx, &status);
        outcome
    }

    async fn handle_inner(&self, ctx: &RequestContext) -> SsrOutcome {
        let (decision, sanitized) = self.route_with_url(ctx);
        tracing::Span::current().record("decision", decision_label(&decision));

        match (decision, sanitized) {
            (RouteDecision::Delegate(reason), _) => self.delegate(reason),
            (RouteDecision::Redirect { location }, _) => match redirect_response(&location) {
                Ok(response) => {
                    tracing::info!(location = %location, "redirecting");
                    SsrOutcome::Respond(response)
                }
                Err(e) => self.fail(e.into()),
            },
            (RouteDecision::Render { path }, Some(url)) => {
                match self.render(ctx.method, &url, &path).await {
                    Ok(response) => SsrOutcome::Respond(response),
                    Err(e) => self.fail(e),
                }
            }
            (RouteDecision::Render { .. }, None) => self.delegate(BypassReason::UntrustedOrigin),
        }
    }

    async fn render(&self, method: Method, url: &SanitizedUrl, path: &str) -> SsrResult<Response<String>> {
        let page_url = url.as_url();
        let is_production = !url.is_dev();

        let content = with_timeout(
            self.content_timeout,
            self.collaborators.content.fetch_content(page_url),
        )
        .await
        .map_err(|e| SsrError::ContentTimeout(e.0))?
        .map_err(SsrError::Content)?;

        let metadata = self
            .collaborators
            .metadata
            .generate(page_url, &content)
            .await
            .map_err(SsrError::Metadata)?;

        let renderer = self
            .collaborators
            .renderer
            .get()
            .await
            .map_err(SsrError::RendererLoad)?;
        let app_html = renderer
            .render_to_string(page_url, &content)
            .await
            .map_err(SsrError::Render)?;

        let internal = pick_internal_origin(&self.config, url);
        tracing::debug!(origin = %internal.origin, source = %internal.source, "internal origin");
        let assets = self.assets.resolve(&internal.origin, is_production).await;
        tracing::Span::current().record("assets", assets.source.as_str());

        let nonce = CspNonce::generate();
        let canonical_url = format!("{}{}", url.origin(), path);
        let html = assemble_document(&DocumentInput {
            nonce: &nonce,
            metadata: &metadata,
            assets: &assets,
            app_html: &app_html,
            content_data: &content,
            canonical_url: &canonical_url,
            is_production,
            is_admin_path: is_admin_path(path),
            config: &self.config,
        })?;

        let headers = SsrHeadersBuilder::new()
            .content_hash(ContentHash::of_json_or_fallback(&content))
            .csp(&ContentSecurityPolicy::for_ssr(&nonce, is_production))
            .asset_source(assets.source)
            .build();

        let body = if method == Method::Head { String::new() } else { html };
        tracing::info!(path, assets = %assets.source, "page rendered");
        Ok(html_response(body, headers)?)
    }

    fn delegate(&self, reason: BypassReason) -> SsrOutcome {
        tracing::debug!(reason = %reason, "delegating to platform");
        SsrOutcome::Delegate(DelegateReason::Bypass(reason))
    }

    fn fail(&self, error: SsrError) -> SsrOutcome {
        tracing::error!(stage = error.stage(), error = %error, "render pipeline failed, delegating");
        SsrOutcome::Delegate(DelegateReason::Failed)
    }
}

fn decision_label(decision: &RouteDecision) -> &'static str {
    match decision {
        RouteDecision::Delegate(reason) => reason.as_str(),
        RouteDecision::Redirect { .. } => "redirect",
        RouteDecision::Render { .. } => "render",
    }
}
