//! Mkdir command implementation.

use clap::Args;

use crate::cli::{check_target, Result};
use crate::config::Config;
use crate::store::RemoteStore;
use crate::util::child_url;
use crate::validate::validate_folder_name;

/// Arguments for the mkdir command.
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Parent container URL.
    pub parent_url: String,

    /// Name of the new folder.
    pub name: String,
}

impl MkdirArgs {
    pub async fn run(self, store: &dyn RemoteStore, config: &Config) -> Result<()> {
        let sanitized = validate_folder_name(&self.name, &config.limits)?;
        let url = child_url(&self.parent_url, &sanitized, true);
        check_target(&url, config)?;

        let node = store.create_container(&url).await?;
        println!("{}", node.url);
        Ok(())
    }
}
