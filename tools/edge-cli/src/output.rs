//! Output formatting for the CLI.
//!
//! Human output goes to stdout with `console` styling. In JSON mode only
//! [`Output::json`] and errors are printed.

use console::style;

/// Width keys are padded to in key-value listings.
const KEY_WIDTH: usize = 20;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if !self.json {
            println!("{} {}", style("✓").green().bold(), msg);
        }
    }

    /// Print a warning to stderr.
    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        }
    }

    /// Print an error to stderr, as `{"error": ...}` in JSON mode.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        }
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if self.verbose && !self.json {
            eprintln!("{}", style(msg).dim());
        }
    }

    /// Print a title line.
    pub fn header(&self, msg: &str) {
        if !self.json {
            println!("{}", style(msg).bold());
        }
    }

    /// Print a `[section]` label.
    pub fn section(&self, name: &str) {
        if !self.json {
            println!("\n{}", style(format!("[{}]", name)).cyan());
        }
    }

    /// Print an aligned key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {} {}", style(format!("{:<KEY_WIDTH$}", key)).dim(), value);
        }
    }

    /// Print an indented list item.
    pub fn list_item(&self, item: &str) {
        if !self.json {
            println!("    - {}", item);
        }
    }

    /// Print a value as pretty JSON.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("failed to serialize output: {}", e)),
        }
    }
}

/// Colored label for a routing decision.
pub fn decision_badge(decision: &str) -> String {
    match decision {
        "render" => style(decision).green().to_string(),
        "redirect" => style(decision).yellow().to_string(),
        "delegate" => style(decision).dim().to_string(),
        _ => decision.to_string(),
    }
}

/// The value, or `-` when missing.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
