//! Test utilities for the NapCat installer
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! - [`RecordingProgress`] / [`RecordingDialog`]: in-memory UI seams that
//!   remember every call so tests can assert on what the user saw
//! - [`ZipFixture`]: builds release archives in memory or on disk
//! - [`init_test_logging`]: one-time `tracing` setup for test output
//!
//! # Example
//!
//! ```rust,no_run
//! use napcat_installer::test_utils::{RecordingProgress, ZipFixture};
//!
//! let archive = ZipFixture::new()
//!     .file("package.json", "{}")
//!     .file("renderer.js", "")
//!     .to_bytes();
//! let progress = RecordingProgress::default();
//! assert!(!archive.is_empty());
//! assert!(progress.titles().is_empty());
//! ```

pub mod fixtures;
pub mod recording;

pub use fixtures::{ZipFixture, framework_zip, write_patch_dir};
pub use recording::{ProgressEvent, RecordingDialog, RecordingProgress};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=napcat_installer=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
