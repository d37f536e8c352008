//! Self-disabling of the installer after a successful run.
//!
//! The host application loads every plugin directory that does not start
//! with the inactive marker. Renaming the installer's own directory to
//! `<marker><name>` keeps it from running again on the next start.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::core::{InstallerError, Result};

/// Renames a directory to its inactive sibling name.
#[derive(Debug, Clone, Copy)]
pub struct SelfDisabler {
    marker: char,
}

impl SelfDisabler {
    /// Create a disabler prefixing directory names with `marker`.
    #[must_use]
    pub const fn new(marker: char) -> Self {
        Self {
            marker,
        }
    }

    /// Sibling path `<parent>/<marker><basename>` for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] with kind `InvalidInput` when `path`
    /// has no final component (e.g. `/` or `..`).
    pub fn disabled_path(&self, path: &Path) -> Result<PathBuf> {
        let Some(name) = path.file_name() else {
            return Err(InstallerError::io(
                "disable",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no directory name"),
            ));
        };

        let mut disabled = std::ffi::OsString::from(self.marker.to_string());
        disabled.push(name);
        Ok(path.with_file_name(disabled))
    }

    /// Rename `self_path` to its disabled name and return the new path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] if the rename fails, for example
    /// because the target already exists as a non-empty directory or a file
    /// inside is locked.
    pub async fn disable(&self, self_path: &Path) -> Result<PathBuf> {
        let target = self.disabled_path(self_path)?;
        fs::rename(self_path, &target)
            .await
            .map_err(|e| InstallerError::io("rename", self_path, e))?;

        info!("Disabled installer: {} -> {}", self_path.display(), target.display());
        Ok(target)
    }
}

impl Default for SelfDisabler {
    fn default() -> Self {
        Self::new('.')
    }
}
