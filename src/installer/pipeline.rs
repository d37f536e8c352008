//! The update pipeline: one sequential install run with a single error boundary.
//!
//! [`UpdatePipeline::run`] performs, strictly in order and without retries:
//!
//! 1. clear an existing installation except its config directory
//! 2. resolve the latest release asset
//! 3. download it to the installer directory
//! 4. extract it into the install target
//! 5. patch `package.json` and `renderer.js`
//! 6. rename the installer directory so it does not run again
//!
//! Each step announces itself on the [`ProgressSink`] before it starts and
//! reports progress while it runs. The first error stops the run: the sink
//! shows the failure title, the [`ErrorDialog`] receives the error report and
//! the error is returned to the caller. Component errors are never wrapped or
//! retried on the way up.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use super::disable::SelfDisabler;
use super::patch::Patcher;
use super::reconcile::DirectoryReconciler;
use super::state::PipelineState;
use crate::config::{InstallPaths, InstallerConfig};
use crate::core::{InstallerError, Result, create_error_context};
use crate::release::{ArchiveExtractor, ReleaseFetcher};
use crate::utils::dialog::ErrorDialog;
use crate::utils::progress::{Progress, ProgressSink};

/// Title while installing into an empty target.
pub const TITLE_INSTALLING: &str = "Installing NapCat";
/// Title when an existing installation is being replaced.
pub const TITLE_UPDATING: &str = "Updating NapCat";
/// Title after a successful run.
pub const TITLE_SUCCEEDED: &str = "NapCat installed 🎉";
/// Title after a failed run.
pub const TITLE_FAILED: &str = "NapCat installation failed ⚠️";

/// Status while an existing installation is cleaned.
pub const STATUS_CLEANING: &str = "Preparing update...";
/// Status while the release asset is looked up.
pub const STATUS_RESOLVING: &str = "Looking up the latest download link...";
/// Status while the archive is downloaded.
pub const STATUS_DOWNLOADING: &str = "Downloading archive...";
/// Status while the archive is unpacked.
pub const STATUS_EXTRACTING: &str = "Extracting...";
/// Status while the patch files are applied.
pub const STATUS_PATCHING: &str = "Patching...";
/// Status while the installer directory is renamed.
pub const STATUS_DISABLING: &str = "Finishing up...";
/// Status after a successful run.
pub const STATUS_SUCCEEDED: &str = "Restart the application to start using NapCat";
/// Status after a failed run; details go to the error dialog.
pub const STATUS_FAILED: &str = "Oops! Something went wrong during installation";

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Directory the framework was installed into.
    pub install_target: PathBuf,
    /// Whether an existing installation was replaced.
    pub updated: bool,
    /// New path of the installer directory, or `None` if renaming it failed
    /// and that failure was not fatal.
    pub disabled_installer: Option<PathBuf>,
}

/// One installer run, from an idle state to `Succeeded` or `Failed`.
pub struct UpdatePipeline {
    config: InstallerConfig,
    paths: InstallPaths,
    fetcher: ReleaseFetcher,
    extractor: ArchiveExtractor,
    reconciler: DirectoryReconciler,
    patcher: Patcher,
    disabler: SelfDisabler,
    progress: Arc<dyn ProgressSink>,
    dialog: Arc<dyn ErrorDialog>,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl UpdatePipeline {
    /// Assemble a pipeline from configuration and the two UI seams.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Network`] if the HTTP client cannot be created.
    pub fn new(
        config: InstallerConfig,
        paths: InstallPaths,
        progress: Arc<dyn ProgressSink>,
        dialog: Arc<dyn ErrorDialog>,
    ) -> Result<Self> {
        let fetcher = ReleaseFetcher::new(&config)?;
        let reconciler = DirectoryReconciler::new(config.preserved_dir_name.clone());
        let patcher = Patcher::new(paths.patch_dir.clone());
        let disabler = SelfDisabler::new(config.inactive_marker);

        Ok(Self {
            config,
            paths,
            fetcher,
            extractor: ArchiveExtractor::new(),
            reconciler,
            patcher,
            disabler,
            progress,
            dialog,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state entered so far, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Returns the first component error, after it has been shown on the
    /// progress sink and the error dialog.
    pub async fn run(&mut self) -> Result<InstallOutcome> {
        self.progress.set_title(TITLE_INSTALLING);
        self.progress.set_progress(Progress::Indeterminate);

        match self.execute().await {
            Ok(outcome) => {
                self.advance(PipelineState::Succeeded);
                self.progress.set_title(TITLE_SUCCEEDED);
                match &outcome.disabled_installer {
                    Some(_) => self.progress.set_status(STATUS_SUCCEEDED),
                    None => self.progress.set_status(&format!(
                        "{STATUS_SUCCEEDED}. Delete {} so the installer does not run again",
                        self.paths.installer_dir.display()
                    )),
                }
                self.progress.set_progress(Progress::DONE);
                info!("NapCat installed into {}", outcome.install_target.display());
                Ok(outcome)
            }
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    async fn execute(&mut self) -> Result<InstallOutcome> {
        let target = self.paths.install_target.clone();

        let updated = fs::try_exists(&target)
            .await
            .map_err(|e| InstallerError::io("inspect", &target, e))?;
        if updated {
            self.progress.set_title(TITLE_UPDATING);
            self.begin(PipelineState::Cleaning, STATUS_CLEANING, Progress::Indeterminate);
            debug!(
                "Cleaning {} (keeping {}/)",
                target.display(),
                self.reconciler.preserved()
            );
            self.reconciler.reconcile(&target).await?;
        }

        self.begin(PipelineState::ResolvingUrl, STATUS_RESOLVING, Progress::Indeterminate);
        debug!("Looking up {} in {}", self.config.asset_name, self.config.repository());
        let asset = self
            .fetcher
            .resolve_latest(&self.config.repo_owner, &self.config.repo_name, &self.config.asset_name)
            .await?;
        debug!("Resolved {} to {}", asset.name, asset.download_url);

        self.begin(PipelineState::Downloading, STATUS_DOWNLOADING, Progress::Ratio(0.0));
        let progress = Arc::clone(&self.progress);
        self.fetcher
            .download(&asset.download_url, &self.paths.archive_path, |p| progress.set_progress(p))
            .await?;

        self.begin(PipelineState::Extracting, STATUS_EXTRACTING, Progress::Ratio(0.0));
        let progress = Arc::clone(&self.progress);
        self.extractor
            .extract(&self.paths.archive_path, &target, move |p| progress.set_progress(p))
            .await?;

        self.begin(PipelineState::Patching, STATUS_PATCHING, Progress::Ratio(0.0));
        let progress = Arc::clone(&self.progress);
        self.patcher.apply(&target, |p| progress.set_progress(p)).await?;

        self.begin(PipelineState::Disabling, STATUS_DISABLING, Progress::Indeterminate);
        let disabled_installer = match self.disabler.disable(&self.paths.installer_dir).await {
            Ok(path) => Some(path),
            Err(error) if !self.config.self_disable_failure_is_fatal => {
                warn!("Installed, but the installer could not disable itself: {error}");
                None
            }
            Err(error) => return Err(error),
        };

        Ok(InstallOutcome {
            install_target: target,
            updated,
            disabled_installer,
        })
    }

    fn begin(&mut self, state: PipelineState, status: &str, progress: Progress) {
        self.advance(state);
        self.progress.set_status(status);
        self.progress.set_progress(progress);
    }

    fn advance(&mut self, next: PipelineState) {
        match self.state.transition(next) {
            Ok(()) => {
                debug!("Pipeline state: {}", self.state);
                self.history.push(self.state.clone());
            }
            Err(e) => warn!("{e}"),
        }
    }

    fn fail(&mut self, error: &InstallerError) {
        warn!("Installation failed in state {}: {error}", self.state);
        self.advance(PipelineState::Failed(error.to_string()));

        self.progress.set_title(TITLE_FAILED);
        self.progress.set_status(STATUS_FAILED);
        self.progress.set_progress(Progress::DONE);

        self.dialog.show_error(TITLE_FAILED, &create_error_context(error));
    }
}
