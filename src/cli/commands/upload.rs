//! Upload command implementation.
//!
//! Reads local files, infers their content types from the upload
//! allow-list table, and hands the batch to the transfer engine.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::{check_target, CliError, Result, TerminalSink};
use crate::config::Config;
use crate::store::RemoteStore;
use crate::transfer::upload_batch;
use crate::validate::{content_type_for_extension, UploadFile};

/// Arguments for the upload command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Destination container URL.
    pub container_url: String,

    /// Local files to upload.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl UploadArgs {
    pub async fn run(self, store: &dyn RemoteStore, config: &Config) -> Result<()> {
        check_target(&self.container_url, config)?;

        let mut batch = Vec::with_capacity(self.files.len());
        for path in &self.files {
            batch.push(read_upload_file(path).await?);
        }

        upload_batch(
            store,
            &self.container_url,
            &batch,
            &config.limits,
            &TerminalSink,
        )
        .await?;
        Ok(())
    }
}

/// Read a local file into an upload candidate.
async fn read_upload_file(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Other(format!("cannot determine file name for {}", path.display())))?;
    let content_type = content_type_for_path(path).ok_or_else(|| {
        CliError::Other(format!(
            "cannot determine content type for {}",
            path.display()
        ))
    })?;
    let bytes = tokio::fs::read(path).await?;
    Ok(UploadFile::new(name, content_type, bytes))
}

/// Infer a content type from a file extension using the upload allow-list.
fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    content_type_for_extension(&format!(".{}", extension.to_ascii_lowercase()))
}
