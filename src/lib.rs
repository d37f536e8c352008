//! napcat-installer - installer and updater for the NapCat framework plugin
//!
//! One run fetches the latest `NapCat.Framework.zip` release asset from
//! GitHub, installs it into the host application's plugins directory, patches
//! two of its files and then disables the installer by renaming its own
//! directory.
//!
//! # Architecture Overview
//!
//! The [`installer::UpdatePipeline`] is the only orchestrator. It owns the
//! components below, calls them strictly in order, and is the single place
//! where errors are reported to the user:
//!
//! ```text
//! DirectoryReconciler -> ReleaseFetcher -> ArchiveExtractor -> Patcher -> SelfDisabler
//!   (existing only)     (resolve, download)
//! ```
//!
//! The user interface is reached only through two injected traits,
//! [`utils::ProgressSink`] and [`utils::ErrorDialog`], so the pipeline runs
//! the same under the terminal renderer and the recording test doubles.
//!
//! # Modules
//!
//! - [`cli`] - command-line flags, logging setup and the run entry point
//! - [`config`] - `installer.toml` settings and the paths of a run
//! - [`core`] - [`core::InstallerError`] and user-facing error reports
//! - [`installer`] - reconcile, patch, self-disable, state machine, pipeline
//! - [`release`] - GitHub release lookup, download and zip extraction
//! - [`utils`] - progress and error dialog seams with terminal renderers
//!
//! # Filesystem Layout
//!
//! ```text
//! <plugins-root>/
//! ├── napcat/                  install target, `config/` survives updates
//! └── napcat-installer/        installer dir, renamed to `.napcat-installer`
//!     ├── installer.toml       optional settings
//!     ├── patch/
//!     │   ├── package.json     merged into napcat/package.json
//!     │   └── renderer.js      appended to napcat/renderer.js
//!     └── temp.zip             downloaded archive, deleted after extraction
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod installer;
pub mod release;
pub mod utils;

// Test utilities (only compiled in test mode)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
