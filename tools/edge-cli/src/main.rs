//! Edge CLI - Command line tool for the edge SSR shim.
//!
//! Commands:
//! - `edge serve` - Serve a built site with server rendering in front
//! - `edge check` - Show how a URL would be routed
//! - `edge assets` - Resolve the bundle tags for a host
//! - `edge config` - Show or validate configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edge_observability::{init_logging, LogFormat, LogLevel};

use commands::{AssetsArgs, CheckArgs, ConfigArgs, ServeArgs};

/// Edge CLI - Serve and inspect the server-rendering shim
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a built site with server rendering
    Serve(ServeArgs),

    /// Show the routing decision for a URL
    Check(CheckArgs),

    /// Resolve bundle tags for a host
    Assets(AssetsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (&cli.command, cli.verbose) {
        (_, true) => LogLevel::Debug,
        (Commands::Serve(_), false) => LogLevel::Info,
        _ => LogLevel::Warn,
    };
    let format = if cli.json { LogFormat::Json } else { LogFormat::Human };
    init_logging(level, format)?;

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Check(args) => commands::check::run(args, &ctx).await,
        Commands::Assets(args) => commands::assets::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
