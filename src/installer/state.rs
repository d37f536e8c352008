//! States of an update run and the allowed transitions between them.
//!
//! ```text
//! Idle ─┬─> Cleaning ─┐
//!       └─────────────┴─> ResolvingUrl -> Downloading -> Extracting
//!                          -> Patching -> Disabling -> Succeeded
//!
//! any non-terminal state ──> Failed(message)
//! ```
//!
//! `Succeeded` and `Failed` are terminal and accept no transitions.

use std::fmt;
use thiserror::Error;

/// Where an update run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, nothing done yet.
    Idle,
    /// Clearing a previous installation.
    Cleaning,
    /// Looking up the latest release asset.
    ResolvingUrl,
    /// Downloading the archive.
    Downloading,
    /// Unpacking the archive into the install target.
    Extracting,
    /// Applying the patch files.
    Patching,
    /// Renaming the installer directory.
    Disabling,
    /// Finished; the framework is installed.
    Succeeded,
    /// Stopped at the first failure, with its message.
    Failed(String),
}

/// Rejected state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pipeline transition from {from} to {to}")]
pub struct InvalidTransition {
    /// State the run was in.
    pub from: PipelineState,
    /// State that was requested.
    pub to: PipelineState,
}

impl PipelineState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: &Self) -> bool {
        use PipelineState::{
            Cleaning, Disabling, Downloading, Extracting, Failed, Idle, Patching, ResolvingUrl,
            Succeeded,
        };

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (_, Failed(_))
                | (Idle, Cleaning | ResolvingUrl)
                | (Cleaning, ResolvingUrl)
                | (ResolvingUrl, Downloading)
                | (Downloading, Extracting)
                | (Extracting, Patching)
                | (Patching, Disabling)
                | (Disabling, Succeeded)
        )
    }

    /// Move to `next` if allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] and leaves `self` unchanged when the
    /// move is not allowed.
    pub fn transition(&mut self, next: Self) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(&next) {
            return Err(InvalidTransition {
                from: self.clone(),
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Cleaning => f.write_str("cleaning"),
            Self::ResolvingUrl => f.write_str("resolving-url"),
            Self::Downloading => f.write_str("downloading"),
            Self::Extracting => f.write_str("extracting"),
            Self::Patching => f.write_str("patching"),
            Self::Disabling => f.write_str("disabling"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}
