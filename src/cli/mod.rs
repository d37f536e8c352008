//! Command-line interface for the NapCat installer.
//!
//! The installer has no subcommands: running it performs one install or
//! update of the NapCat framework. Flags only choose directories, the
//! configuration file, and how much output to show.
//!
//! ```bash
//! # Installer lives in <plugins>/napcat-installer; plugins root is its parent
//! napcat-installer
//!
//! # Explicit directories, plain log output
//! napcat-installer --plugins-root ~/.config/QQ/plugins \
//!     --installer-dir ~/.config/QQ/plugins/napcat-installer --no-progress
//!
//! # Debug logging, custom settings
//! napcat-installer --verbose --config ./installer.toml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{
    CONFIG_PATH_ENV, INSTALLER_DIR_ENV, InstallPaths, InstallerConfig, PLUGINS_ROOT_ENV,
    default_installer_dir,
};
use crate::core::InstallerError;
use crate::installer::UpdatePipeline;
use crate::utils::dialog::TerminalDialog;
use crate::utils::progress::TerminalProgress;

/// Output settings derived from the command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level override; `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,

    /// Hide the animated progress display.
    pub no_progress: bool,

    /// Pause for Enter after showing a fatal error on a terminal.
    pub wait_for_ack: bool,

    /// Skip the final summary line.
    pub quiet: bool,
}

/// Install or update the NapCat framework from its latest GitHub release.
#[derive(Parser, Debug)]
#[command(
    name = "napcat-installer",
    version,
    about = "Install or update the NapCat framework plugin",
    long_about = "Downloads the latest NapCat framework release, installs it into the \
                  plugins directory (keeping its config directory), applies the bundled \
                  patch files, then disables the installer so it does not run again."
)]
pub struct Cli {
    /// Plugins directory of the host application.
    ///
    /// Defaults to the parent of the installer directory.
    #[arg(long, env = PLUGINS_ROOT_ENV, value_name = "DIR")]
    plugins_root: Option<PathBuf>,

    /// Directory of the installer itself, holding `patch/` and the temporary
    /// archive. Defaults to the directory containing this executable.
    #[arg(long, env = INSTALLER_DIR_ENV, value_name = "DIR")]
    installer_dir: Option<PathBuf>,

    /// Installer settings file (default: `<installer-dir>/installer.toml`).
    #[arg(short, long, env = CONFIG_PATH_ENV, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Disable the progress bar; status lines are logged instead.
    #[arg(long)]
    no_progress: bool,

    /// Do not wait for Enter after a fatal error.
    #[arg(long)]
    no_wait: bool,
}

impl Cli {
    /// Translate flags into output settings.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            wait_for_ack: !self.no_wait,
            quiet: self.quiet,
        }
    }

    /// Resolve the installer and plugins directories.
    ///
    /// # Errors
    ///
    /// Fails when the executable location is unknown or the installer
    /// directory has no parent to use as plugins root.
    pub fn resolve_dirs(&self) -> Result<(PathBuf, PathBuf)> {
        let installer_dir = match &self.installer_dir {
            Some(dir) => dir.clone(),
            None => default_installer_dir()?,
        };

        let plugins_root = match &self.plugins_root {
            Some(root) => root.clone(),
            None => installer_dir
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .ok_or_else(|| InstallerError::Config {
                    message: format!(
                        "cannot derive the plugins root from {}; pass --plugins-root",
                        installer_dir.display()
                    ),
                })?,
        };

        Ok((plugins_root, installer_dir))
    }

    /// Run the installer.
    ///
    /// Returns [`ExitCode::FAILURE`] when the pipeline failed; that failure
    /// has already been shown through the error dialog.
    ///
    /// # Errors
    ///
    /// Returns setup errors (directories, configuration, HTTP client) that
    /// happen before the pipeline takes over error reporting.
    pub async fn execute(self) -> Result<ExitCode> {
        let config = self.build_config();
        init_logging(config.log_level.as_deref());
        self.execute_with_config(config).await
    }

    /// Run the installer with explicit output settings and without touching
    /// the global logger.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<ExitCode> {
        let (plugins_root, installer_dir) = self.resolve_dirs()?;
        debug!("Plugins root: {}, installer: {}", plugins_root.display(), installer_dir.display());

        let settings = InstallerConfig::load(self.config.as_deref(), &installer_dir)
            .await
            .context("Failed to load installer configuration")?;
        let paths = InstallPaths::new(plugins_root, installer_dir, &settings);

        let progress = Arc::new(TerminalProgress::with_no_progress(config.no_progress));
        let dialog = Arc::new(TerminalDialog::new(config.wait_for_ack));
        let mut pipeline = UpdatePipeline::new(settings, paths, progress.clone(), dialog)?;

        let result = pipeline.run().await;
        progress.finish();

        match result {
            Ok(outcome) => {
                if !config.quiet {
                    eprintln!(
                        "{} NapCat is installed in {}",
                        "✓".green().bold(),
                        outcome.install_target.display()
                    );
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(_) => Ok(ExitCode::FAILURE),
        }
    }
}

/// Install the global `tracing` subscriber writing to stderr.
///
/// `level` overrides everything; otherwise `RUST_LOG` applies, falling back
/// to `info` for this crate. Calling it twice is harmless.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("napcat_installer={level}")),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("napcat_installer=info")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
