//! Clearing an existing installation before reinstalling.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::core::{InstallerError, Result};

/// Empties an install directory, keeping one preserved subdirectory.
///
/// Only direct children of the directory are inspected. A child directory
/// whose name equals the preserved name is left untouched together with its
/// contents; every other directory is removed recursively and every other
/// file or symlink is removed. Symlinks are never followed.
#[derive(Debug, Clone)]
pub struct DirectoryReconciler {
    preserved: String,
}

impl DirectoryReconciler {
    /// Create a reconciler keeping the subdirectory named `preserved`.
    pub fn new(preserved: impl Into<String>) -> Self {
        Self {
            preserved: preserved.into(),
        }
    }

    /// Name of the subdirectory that survives reconciliation.
    #[must_use]
    pub fn preserved(&self) -> &str {
        &self.preserved
    }

    /// Remove everything in `dir` except the preserved subdirectory.
    ///
    /// A missing `dir` is treated as already clean. Entries that vanish while
    /// the walk is running are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Io`] for the first listing or removal failure
    /// other than "not found"; remaining entries are not touched.
    pub async fn reconcile(&self, dir: &Path) -> Result<()> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(InstallerError::io("read directory", dir, e)),
        };

        let mut removed = 0_usize;
        while let Some(entry) =
            entries.next_entry().await.map_err(|e| InstallerError::io("read directory", dir, e))?
        {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(InstallerError::io("inspect", &path, e)),
            };

            let result = if file_type.is_dir() {
                if entry.file_name() == self.preserved.as_str() {
                    debug!("Keeping {}", path.display());
                    continue;
                }
                fs::remove_dir_all(&path).await.map_err(|e| ("remove directory", e))
            } else {
                fs::remove_file(&path).await.map_err(|e| ("remove file", e))
            };

            match result {
                Ok(()) => removed += 1,
                Err((_, e)) if e.kind() == ErrorKind::NotFound => {}
                Err((operation, e)) => return Err(InstallerError::io(operation, &path, e)),
            }
        }

        debug!("Removed {removed} entries from {}", dir.display());
        Ok(())
    }
}
