//! Progress reporting for long-running transfer operations.

use super::TransferError;

/// Receives lifecycle notifications for one transfer operation.
///
/// Every method has a no-op default, so callers implement only the
/// notifications they care about. For one operation the sink sees at most
/// one `on_prepare`, then any number of `on_progress` calls, terminated by
/// either one `on_complete` or one `on_error`.
pub trait ProgressSink: Send + Sync {
    /// The operation is about to start its main work.
    fn on_prepare(&self, _message: &str) {}

    /// One step finished. `percent` is the completed share of the planned
    /// items, in [0, 100].
    fn on_progress(&self, _message: &str, _percent: f64) {}

    /// One item failed; the operation stops after this notification.
    fn on_error(&self, _error: &TransferError, _item: &str) {}

    /// The whole operation finished successfully.
    fn on_complete(&self, _message: &str) {}
}

/// A sink that ignores every notification.
pub struct NoopSink;

impl ProgressSink for NoopSink {}
