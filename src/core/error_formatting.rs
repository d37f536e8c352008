//! Error formatting utilities for the installer
//!
//! Converts internal errors into the report shown by the fatal error dialog:
//! a headline, diagnostic details with the full source chain, and a hint.

use super::error::{ErrorContext, InstallerError};

/// Render an error and every error in its `source()` chain.
///
/// The first line is the error itself; each cause follows on its own line,
/// prefixed with `Caused by:`. This is the "diagnostic trace" users paste
/// into support channels.
#[must_use]
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        rendered.push_str("\nCaused by: ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Walks the chain looking for an [`InstallerError`]; anything else is
/// wrapped as a configuration error carrying the full chain as its message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let mut chain = error.chain();
    if let Some(installer_error) = chain.next().and_then(|e| e.downcast_ref::<InstallerError>()) {
        return create_error_context(installer_error);
    }

    // Wrapped by anyhow context: keep the outer messages in the details
    for cause in chain {
        if let Some(installer_error) = cause.downcast_ref::<InstallerError>() {
            return create_error_context(installer_error).with_details(error_chain(&*error));
        }
    }

    ErrorContext::new(InstallerError::Config {
        message: format!("{error:#}"),
    })
    .with_details(error_chain(&*error))
    .with_suggestion("Run with --verbose for more details")
}

/// Create a user-friendly error context from an [`InstallerError`].
///
/// Details always carry the error's source chain; the suggestion depends
/// on the failure class.
#[must_use]
pub fn create_error_context(error: &InstallerError) -> ErrorContext {
    let details = error_chain(error);
    let suggestion = match error {
        InstallerError::Network {
            url,
            ..
        } => format!(
            "Check your internet connection and that {url} is reachable, then run the installer again"
        ),
        InstallerError::AssetNotFound {
            asset,
            ..
        } => format!(
            "The latest release does not publish '{asset}' yet; wait for the release to finish uploading and retry"
        ),
        InstallerError::Extract {
            ..
        } => "The downloaded archive may be incomplete; delete it and run the installer again"
            .to_string(),
        InstallerError::Patch {
            ..
        } => "Make sure the installer's patch directory is intact, then run the installer again"
            .to_string(),
        InstallerError::Io {
            source,
            ..
        } if source.kind() == std::io::ErrorKind::PermissionDenied => {
            "Check file permissions and close any program using the plugin directory".to_string()
        }
        InstallerError::Io {
            ..
        } => "Close the host application and run the installer again".to_string(),
        InstallerError::Config {
            ..
        } => "Fix the installer configuration and run the installer again".to_string(),
    };

    ErrorContext::new(error.clone()).with_details(details).with_suggestion(suggestion)
}
