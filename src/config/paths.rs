//! Filesystem layout of one installer run.

use std::path::{Path, PathBuf};

use super::InstallerConfig;
use crate::core::{InstallerError, Result};

/// Environment variable naming the host application's plugins root.
pub const PLUGINS_ROOT_ENV: &str = "NAPCAT_PLUGINS_ROOT";

/// Environment variable naming the installer's own directory.
pub const INSTALLER_DIR_ENV: &str = "NAPCAT_INSTALLER_DIR";

/// The two directories a run works with and the paths derived from them.
///
/// The plugins root is supplied by the host application. The installer
/// directory is where this installer lives: it holds the patch files and the
/// temporary archive, and is renamed once installation is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Directory containing all plugins of the host application.
    pub plugins_root: PathBuf,
    /// Directory of the installer itself.
    pub installer_dir: PathBuf,
    /// Where the framework is extracted to.
    pub install_target: PathBuf,
    /// Temporary download location of the release archive.
    pub archive_path: PathBuf,
    /// Directory holding `package.json` and `renderer.js` overrides.
    pub patch_dir: PathBuf,
}

impl InstallPaths {
    /// Derive every path of a run from the two root directories.
    #[must_use]
    pub fn new(
        plugins_root: impl Into<PathBuf>,
        installer_dir: impl Into<PathBuf>,
        config: &InstallerConfig,
    ) -> Self {
        let plugins_root = plugins_root.into();
        let installer_dir = installer_dir.into();
        Self {
            install_target: plugins_root.join(&config.framework_dir_name),
            archive_path: installer_dir.join(&config.archive_file_name),
            patch_dir: installer_dir.join(&config.patch_dir_name),
            plugins_root,
            installer_dir,
        }
    }
}

/// Default installer directory: the directory containing the running executable.
///
/// # Errors
///
/// Returns [`InstallerError::Io`] when the executable path cannot be determined.
pub fn default_installer_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| InstallerError::io("locate executable", PathBuf::new(), e))?;
    Ok(exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}
