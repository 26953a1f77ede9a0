//! Batch upload of files into a remote container.

use crate::config::LimitsConfig;
use crate::store::RemoteStore;
use crate::validate::{sanitize_name, validate_batch, UploadFile};

use super::plan::TransferPlan;
use super::progress::ProgressSink;
use super::{item_error, Result, TransferError};

/// Upload a batch of files into `container_url`, in input order.
///
/// The whole batch is validated before any network call; a batch that
/// fails validation is rejected without contacting the store or notifying
/// the sink. Files are written strictly sequentially, and the first
/// per-file failure aborts the remaining files — a single-file failure is
/// a batch failure. Files already written before the failure stay written.
pub async fn upload_batch(
    store: &dyn RemoteStore,
    container_url: &str,
    files: &[UploadFile],
    limits: &LimitsConfig,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let validation = validate_batch(files, limits);
    if !validation.is_valid() {
        return Err(TransferError::Validation(validation.errors.join("; ")));
    }

    let mut plan = TransferPlan::new(files.len() as u64);
    sink.on_prepare(&format!("Validating {} files", plan.total_items()));

    for file in files {
        // Percent reflects the files already finished, reported before the
        // current file's transfer begins.
        sink.on_progress(
            &format!(
                "Uploading {} ({}/{})",
                file.name,
                plan.completed_items() + 1,
                plan.total_items()
            ),
            plan.percent(),
        );

        let slug = sanitize_name(&file.name);
        store
            .write_bytes(container_url, file.bytes.clone(), slug, &file.content_type)
            .await
            .map_err(|e| item_error(sink, &file.name, e))?;
        plan.record_completed();
    }

    sink.on_complete(&format!(
        "Completed {}/{} files",
        plan.completed_items(),
        plan.total_items()
    ));
    Ok(())
}
