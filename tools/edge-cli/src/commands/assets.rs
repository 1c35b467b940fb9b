//! Bundle tag resolution for a host.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use edge_assets::{AssetResolver, ResolvedAssets};
use edge_data::HttpFetcher;
use edge_routing::pick_internal_origin;
use edge_security::HostAllowlist;
use serde::Serialize;

use super::AssetsArgs;
use crate::context::Context;

#[derive(Serialize)]
struct AssetsReport<'a> {
    origin: &'a str,
    production: bool,
    #[serde(flatten)]
    assets: &'a ResolvedAssets,
}

/// Run the assets command.
pub async fn run(args: AssetsArgs, ctx: &Context) -> Result<()> {
    let site = ctx.site();
    let allowlist = HostAllowlist::from_config(&site);
    let url = allowlist
        .check_url(&args.host)
        .with_context(|| format!("Cannot resolve assets for {}", args.host))?;

    let origin = match args.origin {
        Some(origin) => origin,
        None => {
            let internal = pick_internal_origin(&site, &url);
            ctx.output
                .debug(&format!("Internal origin from {}", internal.source));
            internal.origin
        }
    };
    let production = !url.is_dev();

    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let assets = AssetResolver::new(Arc::new(fetcher))
        .resolve(&origin, production)
        .await;

    if ctx.output.is_json() {
        ctx.output.json(&AssetsReport {
            origin: &origin,
            production,
            assets: &assets,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Assets for {}", url.origin()));
    ctx.output.kv("origin", &origin);
    ctx.output.kv("source", assets.source.as_str());
    ctx.output.kv("script", &assets.js_script_tag);
    if assets.css_links.is_empty() {
        ctx.output.kv("styles", "-");
    } else {
        ctx.output.kv("styles", "");
        for link in &assets.css_links {
            ctx.output.list_item(link);
        }
    }

    Ok(())
}
