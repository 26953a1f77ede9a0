//! Mv command implementation.

use clap::Args;

use crate::cli::{check_target, Result, TerminalSink};
use crate::config::Config;
use crate::store::RemoteStore;
use crate::transfer::{delete_resource, move_folder};
use crate::util::{base_name, ensure_container_url};
use crate::validate::validate_folder_name;

/// Arguments for the mv command.
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source container URL.
    pub source_url: String,

    /// Destination container URL.
    pub destination_url: String,
}

impl MvArgs {
    pub async fn run(self, store: &dyn RemoteStore, config: &Config) -> Result<()> {
        let destination = ensure_container_url(&self.destination_url);
        validate_folder_name(&base_name(&destination), &config.limits)?;
        check_target(&destination, config)?;

        let sink = TerminalSink;
        move_folder(store, &self.source_url, &destination, &sink).await?;
        // The copy leaves the source in place; remove it once the copy
        // has succeeded.
        delete_resource(store, &self.source_url, &sink).await?;
        Ok(())
    }
}
