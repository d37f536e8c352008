//! Core types shared by every stage of the installer.
//!
//! The installer has a single error boundary: the update pipeline. Every
//! component returns [`InstallerError`] unchanged, and the pipeline turns the
//! first failure into an [`ErrorContext`] for display.
//!
//! - [`error`] defines [`InstallerError`] and [`ErrorContext`]
//! - [`error_formatting`] maps errors to user-facing messages and suggestions

pub mod error;
pub mod error_formatting;

pub use error::{ErrorContext, InstallerError, Result};
pub use error_formatting::{create_error_context, error_chain, user_friendly_error};
