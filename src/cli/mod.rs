//! Command-line interface for podfm.

pub mod args;
pub mod commands;
mod progress;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{read_config, Config};
use crate::store::HttpStore;
use crate::validate::validate_path;

pub use args::GlobalArgs;
pub use progress::TerminalSink;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),

    /// Store error.
    #[error("{0}")]
    Store(#[from] crate::store::StoreError),

    /// Transfer error.
    #[error("{0}")]
    Transfer(#[from] crate::transfer::TransferError),

    /// Validation error.
    #[error("{0}")]
    Validation(#[from] crate::validate::ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// podfm - a file manager for remote pod storage.
#[derive(Parser, Debug)]
#[command(name = "podfm", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the children of a container.
    Ls(commands::ls::LsArgs),

    /// Upload local files into a container.
    Upload(commands::upload::UploadArgs),

    /// Create a new folder inside a container.
    Mkdir(commands::mkdir::MkdirArgs),

    /// Delete a resource, or a container and everything inside it.
    Rm(commands::rm::RmArgs),

    /// Move a folder to a new URL.
    Mv(commands::mv::MvArgs),

    /// Rename a single file within its container.
    Rename(commands::rename::RenameArgs),
}

// =============================================================================
// CLI Execution
// =============================================================================

/// Parse command-line arguments and run the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let mut config = read_config(&self.global.config_source())?;
        if let Some(url) = &self.global.pod_url {
            config.pod.url = Some(url.clone());
        }

        let store = match &config.pod.token {
            Some(token) => HttpStore::with_token(token.clone()),
            None => HttpStore::new(),
        };

        match self.command {
            Command::Ls(args) => args.run(&store, &config, &self.global).await,
            Command::Upload(args) => args.run(&store, &config).await,
            Command::Mkdir(args) => args.run(&store, &config).await,
            Command::Rm(args) => args.run(&store, &config).await,
            Command::Mv(args) => args.run(&store, &config).await,
            Command::Rename(args) => args.run(&store, &config).await,
        }
    }
}

/// Validate a target URL against the configured pod base and the path
/// policy before any network call touches it.
pub(crate) fn check_target(url: &str, config: &Config) -> Result<()> {
    if let Some(base) = &config.pod.url {
        if !url.starts_with(base.as_str()) {
            return Err(CliError::Other(format!(
                "invalid storage URL, expected a URL under {}",
                base
            )));
        }
    }
    validate_path(url, &config.limits)?;
    Ok(())
}
