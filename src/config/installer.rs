//! Installer settings loaded from `installer.toml`.
//!
//! Every field has a built-in default matching the published NapCat
//! framework release, so the file is optional. Lookup order:
//!
//! 1. `--config <path>` on the command line
//! 2. `NAPCAT_INSTALLER_CONFIG` environment variable
//! 3. `<installerDir>/installer.toml`, if present
//! 4. Built-in defaults
//!
//! A file named explicitly (1 or 2) must exist and parse. The GitHub token
//! can also come from `NAPCAT_GITHUB_TOKEN`, which wins over the file.
//!
//! # Example
//!
//! ```toml
//! repo_owner = "NapNeko"
//! repo_name = "NapCatQQ"
//! asset_name = "NapCat.Framework.zip"
//! preserved_dir_name = "config"
//! self_disable_failure_is_fatal = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::core::InstallerError;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "NAPCAT_INSTALLER_CONFIG";

/// Environment variable carrying a GitHub API token.
pub const GITHUB_TOKEN_ENV: &str = "NAPCAT_GITHUB_TOKEN";

/// File name looked up in the installer directory.
pub const CONFIG_FILE_NAME: &str = "installer.toml";

/// Settings controlling where the framework comes from and how it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// GitHub organization or user publishing the framework.
    pub repo_owner: String,

    /// Repository publishing the framework releases.
    pub repo_name: String,

    /// Release asset file name to install.
    pub asset_name: String,

    /// Base URL of the GitHub REST API.
    pub api_base_url: String,

    /// `User-Agent` sent with every request.
    pub user_agent: String,

    /// Optional token for authenticated (higher rate limit) API requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Directory name of the framework under the plugins root.
    pub framework_dir_name: String,

    /// Subdirectory of an existing installation that survives reinstalls.
    pub preserved_dir_name: String,

    /// File name of the temporary archive inside the installer directory.
    pub archive_file_name: String,

    /// Directory inside the installer directory holding the patch files.
    pub patch_dir_name: String,

    /// Character prefixed to the installer directory name to disable it.
    pub inactive_marker: char,

    /// Whether a failed self-disable fails the whole run.
    ///
    /// When `false`, the framework is reported as installed and the user is
    /// asked to remove the installer directory manually.
    pub self_disable_failure_is_fatal: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            repo_owner: "NapNeko".to_string(),
            repo_name: "NapCatQQ".to_string(),
            asset_name: "NapCat.Framework.zip".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            user_agent: format!("napcat-installer/{}", env!("CARGO_PKG_VERSION")),
            github_token: None,
            framework_dir_name: "napcat".to_string(),
            preserved_dir_name: "config".to_string(),
            archive_file_name: "temp.zip".to_string(),
            patch_dir_name: "patch".to_string(),
            inactive_marker: '.',
            self_disable_failure_is_fatal: false,
        }
    }
}

impl InstallerConfig {
    /// Resolve and load the configuration for an installer directory.
    ///
    /// See the module docs for the lookup order. Environment overrides are
    /// applied and the result is validated before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, any file
    /// fails to parse, or the resulting settings are invalid.
    pub async fn load(explicit: Option<&Path>, installer_dir: &Path) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from(&path).await?,
            None => {
                let path = installer_dir.join(CONFIG_FILE_NAME);
                if fs::try_exists(&path).await.unwrap_or(false) {
                    Self::load_from(&path).await?
                } else {
                    debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, installer_dir.display());
                    Self::default()
                }
            }
        };

        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.github_token = Some(token.trim().to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    /// matching [`InstallerConfig`].
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read installer config from {}", path.display()))?;

        debug!("Loaded installer config from {}", path.display());
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse installer config from {}", path.display()))
    }

    /// Check the settings for values that would break path handling.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] naming the first invalid field.
    pub fn validate(&self) -> std::result::Result<(), InstallerError> {
        let names = [
            ("repo_owner", &self.repo_owner),
            ("repo_name", &self.repo_name),
            ("asset_name", &self.asset_name),
            ("framework_dir_name", &self.framework_dir_name),
            ("preserved_dir_name", &self.preserved_dir_name),
            ("archive_file_name", &self.archive_file_name),
            ("patch_dir_name", &self.patch_dir_name),
        ];

        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(config_error(format!("{field} must not be empty")));
            }
            if value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(config_error(format!(
                    "{field} must be a plain name without path separators, got '{value}'"
                )));
            }
        }

        if self.api_base_url.trim().is_empty() {
            return Err(config_error("api_base_url must not be empty"));
        }

        if matches!(self.inactive_marker, '/' | '\\') || self.inactive_marker.is_control() {
            return Err(config_error(format!(
                "inactive_marker must be a printable non-separator character, got {:?}",
                self.inactive_marker
            )));
        }

        Ok(())
    }

    /// Repository in `owner/name` form.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

fn config_error(message: impl Into<String>) -> InstallerError {
    InstallerError::Config {
        message: message.into(),
    }
}
