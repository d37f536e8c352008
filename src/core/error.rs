//! Error handling for the NapCat installer
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** so callers and tests can tell failure modes apart
//! 2. **User-friendly reports** with details and a suggestion for the error dialog
//!
//! # Error Categories
//!
//! - **Network**: [`InstallerError::Network`] for metadata and download failures
//! - **Release lookup**: [`InstallerError::AssetNotFound`] when no matching asset exists
//! - **Archive**: [`InstallerError::Extract`] for corrupt archives or unpack I/O failures
//! - **Patching**: [`InstallerError::Patch`] for missing or malformed patch files
//! - **File system**: [`InstallerError::Io`] for cleanup, rename and temp-file handling
//! - **Configuration**: [`InstallerError::Config`] for invalid installer settings
//!
//! # Examples
//!
//! ```rust,no_run
//! use napcat_installer::core::{ErrorContext, InstallerError};
//!
//! let error = InstallerError::AssetNotFound {
//!     asset: "NapCat.Framework.zip".to_string(),
//!     repository: "NapNeko/NapCatQQ".to_string(),
//!     reason: "no asset with that name in the latest release".to_string(),
//! };
//!
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Check that the latest release publishes the framework archive");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by every installer component.
pub type Result<T> = std::result::Result<T, InstallerError>;

/// The error type for installer operations.
///
/// Each variant corresponds to one failure class of the update pipeline.
/// Components never recover from these locally; they propagate unchanged
/// to the pipeline, which reports the first one and stops.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Network failure while talking to the release host.
    ///
    /// Covers transport errors, unexpected HTTP statuses and exceeding the
    /// one-redirect limit of asset downloads.
    #[error("Network error while {operation}: {reason}")]
    Network {
        /// What the installer was doing (e.g. "fetching release metadata")
        operation: String,
        /// URL of the failed request
        url: String,
        /// Reason reported by the HTTP client or the server
        reason: String,
    },

    /// The latest release has no usable asset with the expected name.
    ///
    /// Also raised when the release metadata cannot be parsed at all.
    #[error("Release asset '{asset}' not found in {repository}: {reason}")]
    AssetNotFound {
        /// Expected asset file name
        asset: String,
        /// Repository in `owner/name` form
        repository: String,
        /// Why no asset could be selected
        reason: String,
    },

    /// Extraction of the downloaded archive failed.
    #[error("Failed to extract archive {}: {reason}", .archive.display())]
    Extract {
        /// Path to the archive, left in place for diagnosis
        archive: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Applying the patch files failed.
    #[error("Failed to patch {}: {reason}", .path.display())]
    Patch {
        /// File being read, parsed or written
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// A file system operation failed.
    #[error("Failed to {operation} {}", .path.display())]
    Io {
        /// The operation that failed (e.g. "remove directory")
        operation: String,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Installer configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the invalid setting
        message: String,
    },
}

impl InstallerError {
    /// Build an [`InstallerError::Io`] from an operation label and path.
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network {
                ..
            } => "network",
            Self::AssetNotFound {
                ..
            } => "not-found",
            Self::Extract {
                ..
            } => "extract",
            Self::Patch {
                ..
            } => "patch",
            Self::Io {
                ..
            } => "io",
            Self::Config {
                ..
            } => "config",
        }
    }
}

impl Clone for InstallerError {
    fn clone(&self) -> Self {
        match self {
            Self::Network {
                operation,
                url,
                reason,
            } => Self::Network {
                operation: operation.clone(),
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::AssetNotFound {
                asset,
                repository,
                reason,
            } => Self::AssetNotFound {
                asset: asset.clone(),
                repository: repository.clone(),
                reason: reason.clone(),
            },
            Self::Extract {
                archive,
                reason,
            } => Self::Extract {
                archive: archive.clone(),
                reason: reason.clone(),
            },
            Self::Patch {
                path,
                reason,
            } => Self::Patch {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Io {
                operation,
                path,
                source,
            } => Self::Io {
                operation: operation.clone(),
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Config {
                message,
            } => Self::Config {
                message: message.clone(),
            },
        }
    }
}

/// An installer error enriched with details and a suggestion for the user.
///
/// This is what the fatal error dialog presents: the error headline, the
/// diagnostic details (including the source chain) and one actionable hint.
///
/// # Examples
///
/// ```rust,no_run
/// use napcat_installer::core::{ErrorContext, InstallerError};
///
/// let context = ErrorContext::new(InstallerError::Config {
///     message: "asset_name must not be empty".to_string(),
/// })
/// .with_suggestion("Fix installer.toml and run the installer again")
/// .with_details("asset_name = \"\"");
///
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying installer error
    pub error: InstallerError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: InstallerError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
