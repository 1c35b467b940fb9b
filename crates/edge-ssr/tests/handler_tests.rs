//! End-to-end handler scenarios.

mod common;

use std::time::Duration;

use common::*;
use edge_ssr::edge_core::SKIP_SSR_HEADER;
use edge_ssr::edge_data::{StubFetcher, StubReply};
use edge_ssr::edge_security::{ContentHash, CSP_REPORT_ONLY_HEADER};
use edge_ssr::prelude::*;
use http::StatusCode;

fn response(outcome: &SsrOutcome) -> &http::Response<String> {
    outcome.response().expect("expected a response")
}

// === Redirect Tests ===

#[tokio::test]
async fn test_trailing_slash_redirect() {
    let harness = HarnessBuilder::new().build();
    let outcome = harness
        .handler
        .handle(&get("https://www.example.com/ai-rename-variants/"))
        .await;

    let response = response(&outcome);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        header(response, "location"),
        Some("https://www.example.com/ai-rename-variants")
    );
    assert_eq!(
        header(response, "cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );
    assert_eq!(harness.content_calls(), 0);
}

#[tokio::test]
async fn test_legacy_alias_redirect_keeps_query() {
    let harness = HarnessBuilder::new().build();
    let outcome = harness
        .handler
        .handle(&get("https://www.example.com/biblio-rename?ref=x#pricing"))
        .await;

    let response = response(&outcome);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        header(response, "location"),
        Some("https://www.example.com/figma-component-variant-renamer?ref=x")
    );
}

#[tokio::test]
async fn test_normalized_path_does_not_redirect() {
    let harness = HarnessBuilder::new().build();
    let outcome = harness.handler.handle(&get("https://www.example.com/docs?q=1")).await;
    assert_eq!(response(&outcome).status(), StatusCode::OK);
}

// === Delegation Tests ===

#[tokio::test]
async fn test_disallowed_host_delegates() {
    let harness = HarnessBuilder::new()
        .config(SiteConfig::default().with_allowed_hosts(&["example.com"]))
        .build();

    let outcome = harness.handler.handle(&get("https://evil.example/docs")).await;

    assert!(matches!(
        outcome,
        SsrOutcome::Delegate(DelegateReason::Bypass(BypassReason::UntrustedOrigin))
    ));
    assert_eq!(harness.content_calls(), 0);
    assert!(harness.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_empty_allowlist_fails_open() {
    let harness = HarnessBuilder::new().config(SiteConfig::default()).build();
    let outcome = harness.handler.handle(&get("https://evil.example/docs")).await;
    assert_eq!(response(&outcome).status(), StatusCode::OK);
}

#[tokio::test]
async fn test_skip_header_never_calls_collaborators() {
    let harness = HarnessBuilder::new().build();
    let ctx = get("https://www.example.com/docs").with_header(SKIP_SSR_HEADER, "1");

    let outcome = harness.handler.handle(&ctx).await;

    assert!(matches!(
        outcome,
        SsrOutcome::Delegate(DelegateReason::Bypass(BypassReason::SkipHeader))
    ));
    assert_eq!(harness.content_calls(), 0);
    assert_eq!(harness.render_calls(), 0);
    assert_eq!(harness.loads(), 0);
    assert!(harness.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_non_renderable_requests_delegate() {
    let harness = HarnessBuilder::new().build();

    let post = RequestContext::new(Method::Post, "https://www.example.com/contact");
    assert!(harness.handler.handle(&post).await.is_delegate());

    for path in [
        "/assets/main-4f2c.js",
        "/favicon.ico",
        "/admin",
        "/api/subscribe",
        "/api/",
        "/assets/",
    ] {
        let outcome = harness
            .handler
            .handle(&get(&format!("https://www.example.com{}", path)))
            .await;
        assert!(
            matches!(
                outcome,
                SsrOutcome::Delegate(DelegateReason::Bypass(BypassReason::StaticPath))
            ),
            "{}",
            path
        );
    }

    let dev = harness.handler.handle(&get("http://localhost:8888/docs")).await;
    assert!(matches!(
        dev,
        SsrOutcome::Delegate(DelegateReason::Bypass(BypassReason::DevHost))
    ));
    assert_eq!(harness.content_calls(), 0);
}

// === Failure Tests ===

#[tokio::test]
async fn test_content_failure_delegates() {
    let harness = HarnessBuilder::new().content(ContentMode::Fail).build();
    let outcome = harness.handler.handle(&get("https://www.example.com/docs")).await;

    assert!(matches!(outcome, SsrOutcome::Delegate(DelegateReason::Failed)));
    assert_eq!(harness.render_calls(), 0);
}

#[tokio::test]
async fn test_content_timeout_delegates() {
    let harness = HarnessBuilder::new()
        .content(ContentMode::Hang)
        .content_timeout(Duration::from_millis(20))
        .build();

    let outcome = harness.handler.handle(&get("https://www.example.com/docs")).await;
    assert!(matches!(outcome, SsrOutcome::Delegate(DelegateReason::Failed)));
}

#[tokio::test]
async fn test_renderer_load_failure_delegates() {
    let harness = HarnessBuilder::new().renderer_fails().build();
    let outcome = harness.handler.handle(&get("https://www.example.com/docs")).await;

    assert!(matches!(outcome, SsrOutcome::Delegate(DelegateReason::Failed)));
    assert_eq!(harness.render_calls(), 0);
}

// === Render Tests ===

#[tokio::test]
async fn test_rendered_page_document() {
    let harness = HarnessBuilder::new().build();
    let outcome = harness.handler.handle(&get("https://www.example.com/docs?q=1")).await;

    let response = response(&outcome);
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.body();

    assert_eq!(html.matches("window.__SSR_DATA__").count(), 1);
    let json = ssr_data_json(html);
    assert!(!json.is_empty());
    assert!(!json.contains('<'));
    assert!(!json.contains('>'));
    assert!(!json.contains('&'));

    let data: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(data["url"], "https://www.example.com/docs");
    assert_eq!(data["contentData"]["title"], "Rename <Variants> & Props");

    assert!(html.contains("<title>Rename &lt;Variants&gt; &amp; Props</title>"));
    assert!(html.contains(r#"<main data-path="/docs">"#));
    assert!(html.contains(r#"src="/assets/main-4f2c.js""#));
    assert!(html.contains(r#"href="/assets/main-9b1e.css""#));
}

#[tokio::test]
async fn test_inline_scripts_share_csp_nonce() {
    let harness = HarnessBuilder::new().build();
    let outcome = harness.handler.handle(&get("https://www.example.com/")).await;
    let response = response(&outcome);

    let csp = header(response, CSP_REPORT_ONLY_HEADER).unwrap();
    let start = csp.find("'nonce-").unwrap() + "'nonce-".len();
    let nonce = &csp[start..start + 32];
    let attr = format!("nonce=\"{}\"", nonce);

    let inline = inline_script_tags(response.body());
    assert!(inline.len() >= 4);
    for tag in inline {
        assert!(tag.contains(&attr), "script without the response nonce: {}", tag);
    }
}

#[tokio::test]
async fn test_response_headers() {
    let harness = HarnessBuilder::new().build();
    let content = serde_json::json!({
        "title": "Rename <Variants> & Props",
        "body": "</script><script>alert(1)</script>",
    });
    let expected = ContentHash::of_json(&content).unwrap();

    let outcome = harness.handler.handle(&get("https://www.example.com/docs")).await;
    let response = response(&outcome);

    assert_eq!(header(response, "content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(
        header(response, "cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );
    assert_eq!(header(response, "pragma"), Some("no-cache"));
    assert_eq!(header(response, "expires"), Some("0"));
    assert_eq!(header(response, "vary"), Some("Accept, User-Agent"));
    assert_eq!(header(response, "etag"), Some(expected.etag().as_str()));
    assert_eq!(header(response, "x-content-hash"), Some(expected.as_str()));
    assert_eq!(header(response, "x-ssr-generated"), Some("true"));
    assert_eq!(header(response, "x-ssr-assets"), Some("manifest"));
}

#[tokio::test]
async fn test_same_content_same_etag_fresh_nonce() {
    let harness = HarnessBuilder::new().build();
    let first = harness.handler.handle(&get("https://www.example.com/docs")).await;
    let second = harness.handler.handle(&get("https://www.example.com/docs")).await;

    let (first, second) = (response(&first), response(&second));
    assert_eq!(header(first, "etag"), header(second, "etag"));
    assert_ne!(
        header(first, CSP_REPORT_ONLY_HEADER),
        header(second, CSP_REPORT_ONLY_HEADER)
    );
}

#[tokio::test]
async fn test_renderer_loaded_once() {
    let harness = HarnessBuilder::new().build();
    for path in ["/", "/docs", "/pricing"] {
        let outcome = harness
            .handler
            .handle(&get(&format!("https://www.example.com{}", path)))
            .await;
        assert!(!outcome.is_delegate());
    }
    assert_eq!(harness.loads(), 1);
    assert_eq!(harness.render_calls(), 3);
}

#[tokio::test]
async fn test_head_request_has_headers_without_body() {
    let harness = HarnessBuilder::new().build();
    let ctx = RequestContext::new(Method::Head, "https://www.example.com/docs");
    let outcome = harness.handler.handle(&ctx).await;

    let response = response(&outcome);
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().is_empty());
    assert!(header(response, "etag").is_some());
}

// === Asset Tier Tests ===

#[tokio::test]
async fn test_manifest_fetched_from_deploy_origin_with_skip_header() {
    let harness = HarnessBuilder::new().build();
    harness.handler.handle(&get("https://www.example.com/docs")).await;

    let requests = harness.fetcher.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{}/manifest.json", DEPLOY_ORIGIN));
    assert!(requests[0].is_skip_ssr());
}

#[tokio::test]
async fn test_unreachable_assets_fall_back() {
    let harness = HarnessBuilder::new()
        .fetcher(
            StubFetcher::new()
                .with_reply(format!("{}/manifest.json", DEPLOY_ORIGIN), StubReply::Timeout)
                .with_reply(format!("{}/.vite/manifest.json", DEPLOY_ORIGIN), StubReply::Refused)
                .with_reply(format!("{}/index.html", DEPLOY_ORIGIN), StubReply::Timeout),
        )
        .build();

    let outcome = harness.handler.handle(&get("https://www.example.com/docs")).await;
    let response = response(&outcome);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(response, "x-ssr-assets"), Some("fallback"));
    assert!(response.body().contains(r#"src="/assets/index.js""#));
}

#[tokio::test]
async fn test_dev_host_preview_uses_dev_entry() {
    let harness = HarnessBuilder::new().render_dev_hosts().build();
    let outcome = harness.handler.handle(&get("http://localhost:5173/docs")).await;
    let response = response(&outcome);

    assert_eq!(header(response, "x-ssr-assets"), Some("dev"));
    assert!(response.body().contains(r#"src="/src/main.tsx""#));
    assert!(response.body().contains("/@vite/client"));
    assert!(!response.body().contains("googletagmanager"));
    assert!(harness.fetcher.requests().is_empty());
}
