//! Terminal rendering of transfer progress.

use crossterm::style::{Color, Stylize};

use crate::transfer::{ProgressSink, TransferError};

/// A [`ProgressSink`] that renders progress lines to stderr, keeping
/// stdout free for command output.
pub struct TerminalSink;

impl ProgressSink for TerminalSink {
    fn on_prepare(&self, message: &str) {
        eprintln!("{}", message.with(Color::DarkGrey));
    }

    fn on_progress(&self, message: &str, percent: f64) {
        eprintln!("[{:>3.0}%] {}", percent, message);
    }

    fn on_error(&self, error: &TransferError, item: &str) {
        eprintln!("{} {}: {}", "error".with(Color::Red), item, error);
    }

    fn on_complete(&self, message: &str) {
        eprintln!("{}", message.with(Color::Green));
    }
}
