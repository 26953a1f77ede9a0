//! Rename command implementation.

use clap::Args;

use crate::cli::{check_target, CliError, Result, TerminalSink};
use crate::config::Config;
use crate::store::RemoteStore;
use crate::transfer::rename_file;
use crate::util::{child_url, parent_url};
use crate::validate::{sanitize_name, validate_file_name};

/// Arguments for the rename command.
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// URL of the file to rename.
    pub url: String,

    /// New file name.
    pub new_name: String,
}

impl RenameArgs {
    pub async fn run(self, store: &dyn RemoteStore, config: &Config) -> Result<()> {
        if !validate_file_name(&self.new_name, &config.limits) {
            return Err(CliError::Other(format!(
                "invalid file name: {}",
                self.new_name
            )));
        }
        let sanitized = sanitize_name(&self.new_name);

        let parent = parent_url(&self.url)
            .ok_or_else(|| CliError::Other(format!("no parent container for {}", self.url)))?;
        let destination = child_url(&parent, sanitized, false);
        check_target(&destination, config)?;

        rename_file(store, &self.url, sanitized, &TerminalSink).await?;
        Ok(())
    }
}
