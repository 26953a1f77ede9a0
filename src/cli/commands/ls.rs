//! List command implementation.

use clap::Args;
use crossterm::style::{Color, Stylize};

use crate::cli::{check_target, GlobalArgs, Result};
use crate::config::Config;
use crate::store::RemoteStore;

/// Arguments for the ls command.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Container URL to list.
    pub url: String,
}

impl LsArgs {
    pub async fn run(
        self,
        store: &dyn RemoteStore,
        config: &Config,
        global: &GlobalArgs,
    ) -> Result<()> {
        check_target(&self.url, config)?;
        let children = store.list_children(&self.url).await?;

        if global.json {
            for node in &children {
                println!("{}", serde_json::to_string(node)?);
            }
            return Ok(());
        }

        for node in &children {
            let name = node.name();
            if node.is_container {
                println!("{}/", name.with(Color::Blue));
            } else {
                let content_type = node.content_type.as_deref().unwrap_or("-");
                println!("{}  {}", name, content_type.with(Color::DarkGrey));
            }
        }
        Ok(())
    }
}
