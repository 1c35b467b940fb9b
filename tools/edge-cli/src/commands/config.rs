//! Configuration commands.

use anyhow::{bail, Result};
use edge_core::SiteConfig;
use serde::Serialize;

use super::{ConfigArgs, ConfigCommand};
use crate::config::ServerConfig;
use crate::context::Context;
use crate::output::or_dash;

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    config_file: Option<String>,
    site: &'a SiteConfig,
    server: &'a ServerConfig,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let site = ctx.site();
    let server = &ctx.config.server;
    let config_file = ctx.config_path.as_ref().map(|p| p.display().to_string());

    if ctx.output.is_json() {
        ctx.output.json(&EffectiveConfig {
            config_file,
            site: &site,
            server,
        });
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    ctx.output.kv("file", &or_dash(config_file.as_deref()));

    ctx.output.section("site");
    ctx.output.kv("allowed_hosts", &join_or_dash(&site.allowed_hosts));
    ctx.output.kv("allowed_origins", &join_or_dash(&site.allowed_origins));
    ctx.output.kv("site_url", &or_dash(site.site_url.as_deref()));
    ctx.output.kv("deploy_url", &or_dash(site.deploy_url.as_deref()));
    ctx.output.kv("internal_origin", &or_dash(site.internal_origin.as_deref()));
    ctx.output.kv("analytics_id", &or_dash(site.analytics_id.as_deref()));
    ctx.output
        .kv("tracking_script_url", &or_dash(site.tracking_script_url.as_deref()));
    ctx.output.kv("site_name", &site.site_name);

    ctx.output.section("server");
    ctx.output.kv("bind", &server.bind);
    ctx.output.kv("dist_dir", &server.dist_dir.display().to_string());
    ctx.output.kv("content_dir", &server.content_dir.display().to_string());
    ctx.output.kv("scheme", &server.scheme);

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let site = ctx.site();
    let server = &ctx.config.server;
    let mut problems = 0;

    if let Err(errors) = site.validate() {
        for error in &errors {
            ctx.output.error(&error.to_string());
        }
        problems += errors.len();
    }

    if !matches!(server.scheme.as_str(), "http" | "https") {
        ctx.output
            .error(&format!("server.scheme: expected http or https, got '{}'", server.scheme));
        problems += 1;
    }

    if site.allowed_hosts.is_empty() && site.allowed_origins.is_empty() {
        ctx.output
            .warn("No allowed hosts configured; every host receives server-rendered pages");
    }
    for (name, dir) in [("dist_dir", &server.dist_dir), ("content_dir", &server.content_dir)] {
        let path = ctx.resolve_path(dir);
        if !path.is_dir() {
            ctx.output
                .warn(&format!("server.{}: {} does not exist", name, path.display()));
        }
    }

    if problems > 0 {
        bail!("Configuration has {} error(s)", problems);
    }

    ctx.output.success("Configuration is valid");
    Ok(())
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
