//! Configuration management for the NapCat installer
//!
//! - [`installer`]: [`InstallerConfig`], the optional `installer.toml` settings
//! - [`paths`]: [`InstallPaths`], the directories one run reads and writes
//!
//! Configuration is resolved once at startup by the CLI layer and handed to
//! the pipeline by value; nothing reads it globally afterwards.

pub mod installer;
pub mod paths;

pub use installer::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, GITHUB_TOKEN_ENV, InstallerConfig};
pub use paths::{INSTALLER_DIR_ENV, InstallPaths, PLUGINS_ROOT_ENV, default_installer_dir};
