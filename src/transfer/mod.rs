//! Transfer engine: batch upload, recursive deletion, and move/rename
//! operations against a remote store, with progress reporting.
//!
//! Every operation takes the store as an explicit parameter and reports
//! through a [`ProgressSink`]. Operations are not transactional: work done
//! before a failure stands, and the caller is expected to re-list the
//! affected container to reconcile after any reported error. No retry is
//! performed at any layer.

mod delete;
mod move_ops;
mod plan;
mod progress;
mod upload;

pub use delete::delete_resource;
pub use move_ops::{move_folder, rename_file};
pub use plan::TransferPlan;
pub use progress::{NoopSink, ProgressSink};
pub use upload::upload_batch;

use crate::store::StoreError;

/// Result type for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Errors that can occur during transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Pre-flight validation failed; no network call was made.
    #[error("upload validation failed: {0}")]
    Validation(String),

    /// One item of a multi-item operation failed. Work already done is not
    /// rolled back; the remaining items are not attempted.
    #[error("{item}: {source}")]
    Item {
        /// Identifier of the failing item (file name or URL).
        item: String,
        #[source]
        source: StoreError,
    },

    /// A store operation outside any per-item loop failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Report a failed item through the sink and wrap it for the caller.
///
/// The sink sees the error exactly once, at the failure site.
pub(crate) fn item_error(
    sink: &dyn ProgressSink,
    item: &str,
    source: StoreError,
) -> TransferError {
    let error = TransferError::Item {
        item: item.to_string(),
        source,
    };
    sink.on_error(&error, item);
    error
}
