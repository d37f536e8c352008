//! Utility modules for the installer UI seams.
//!
//! - [`progress`]: the [`ProgressSink`] capability and its `indicatif` renderer
//! - [`dialog`]: the blocking [`ErrorDialog`] used for fatal errors

pub mod dialog;
pub mod progress;

pub use dialog::{ErrorDialog, TerminalDialog};
pub use progress::{Progress, ProgressSink, TerminalProgress};
