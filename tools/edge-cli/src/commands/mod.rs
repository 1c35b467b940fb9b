//! CLI command implementations.

pub mod assets;
pub mod check;
pub mod config;
pub mod serve;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (default: from config).
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Built SPA directory (default: from config).
    #[arg(long)]
    pub dist: Option<PathBuf>,

    /// Page content directory (default: from config).
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Render localhost requests instead of delegating them.
    #[arg(long)]
    pub dev_render: bool,

    /// Content fetch timeout in milliseconds.
    #[arg(long)]
    pub content_timeout_ms: Option<u64>,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Absolute request URL.
    pub url: String,

    /// Send the skip header.
    #[arg(long)]
    pub skip: bool,

    /// Request method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Render localhost requests instead of delegating them.
    #[arg(long)]
    pub dev_render: bool,
}

/// Arguments for the assets command.
#[derive(Args)]
pub struct AssetsArgs {
    /// Request URL or origin whose assets to resolve.
    #[arg(long)]
    pub host: String,

    /// Fetch from this origin instead of the picked internal origin.
    #[arg(long)]
    pub origin: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}
