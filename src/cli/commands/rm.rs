//! Rm command implementation.

use clap::Args;

use crate::cli::{check_target, Result, TerminalSink};
use crate::config::Config;
use crate::store::RemoteStore;
use crate::transfer::delete_resource;

/// Arguments for the rm command.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// URL of the resource or container to delete.
    pub url: String,
}

impl RmArgs {
    pub async fn run(self, store: &dyn RemoteStore, config: &Config) -> Result<()> {
        check_target(&self.url, config)?;
        delete_resource(store, &self.url, &TerminalSink).await?;
        Ok(())
    }
}
