//! Routing decision for a single URL.

use anyhow::Result;
use edge_core::{Method, RequestContext, SiteConfig, SKIP_SSR_HEADER};
use edge_routing::{decide_with, pick_internal_origin, RouteDecision, RouteOptions};
use edge_security::HostAllowlist;
use serde::Serialize;

use super::CheckArgs;
use crate::context::Context;
use crate::output::{decision_badge, or_dash};

/// How a URL would be handled.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub url: String,
    pub method: String,
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_source: Option<String>,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let report = check(&ctx.site(), &args);

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.header(&format!("{} {}", report.method, report.url));
    ctx.output.kv("decision", &decision_badge(report.decision));
    if let Some(reason) = &report.reason {
        ctx.output.kv("reason", reason);
    }
    if let Some(location) = &report.location {
        ctx.output.kv("location", location);
    }
    if let Some(path) = &report.path {
        ctx.output.kv("path", path);
    }
    if let Some(rejected) = &report.rejected {
        ctx.output.kv("rejected", rejected);
    }
    ctx.output
        .kv("internal origin", &or_dash(report.internal_origin.as_deref()));
    ctx.output.kv("origin source", &or_dash(report.origin_source.as_deref()));

    Ok(())
}

/// Route `args.url` against `site` without fetching anything.
pub fn check(site: &SiteConfig, args: &CheckArgs) -> CheckReport {
    let allowlist = HostAllowlist::from_config(site);
    let method = Method::parse(&args.method);

    let mut request = RequestContext::new(method, args.url.as_str());
    if args.skip {
        request = request.with_header(SKIP_SSR_HEADER, "1");
    }

    let (sanitized, rejected) = match allowlist.check_url(&args.url) {
        Ok(url) => (Some(url), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let options = RouteOptions {
        render_dev_hosts: args.dev_render,
    };
    let decision = decide_with(&request, sanitized.as_ref(), &options);
    let internal = sanitized.as_ref().map(|url| pick_internal_origin(site, url));

    let mut report = CheckReport {
        url: args.url.clone(),
        method: method.as_str().to_string(),
        decision: "",
        reason: None,
        location: None,
        path: None,
        rejected,
        internal_origin: internal.as_ref().map(|i| i.origin.clone()),
        origin_source: internal.as_ref().map(|i| i.source.to_string()),
    };

    match decision {
        RouteDecision::Delegate(reason) => {
            report.decision = "delegate";
            report.reason = Some(reason.to_string());
        }
        RouteDecision::Redirect { location } => {
            report.decision = "redirect";
            report.location = Some(location);
        }
        RouteDecision::Render { path } => {
            report.decision = "render";
            report.path = Some(path);
        }
    }

    report
}
