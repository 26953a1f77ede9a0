//! Command-line argument definitions and helpers.

use std::path::PathBuf;

use clap::Args;

use crate::config::ConfigSource;

/// Global arguments that apply to all commands.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Configuration overrides in the form section.key=value.
    #[arg(long = "config", value_parser = parse_config_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Pod base URL (overrides the configured [pod] url).
    #[arg(long = "pod-url", global = true)]
    pub pod_url: Option<String>,

    /// Format output as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Build the configuration source from the global arguments.
    pub fn config_source(&self) -> ConfigSource {
        ConfigSource {
            config_file: self.config_file.clone(),
            overrides: self.config_overrides.clone(),
        }
    }
}

/// Parse a single `section.key=value` override.
fn parse_config_override(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected section.key=value, got '{}'", s)),
    }
}
