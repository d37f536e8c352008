//! Progress reporting for the installer UI.
//!
//! The update pipeline never talks to a window or terminal directly. It holds
//! an injected [`ProgressSink`] and reports three things through it: a title,
//! a status line and a [`Progress`] value. Calls are fire-and-forget.
//!
//! [`TerminalProgress`] renders those calls with `indicatif`: a bar while the
//! ratio is known, a spinner while it is not. Set `NAPCAT_NO_PROGRESS` (or pass
//! `--no-progress`) to hide it; titles and status lines are still logged.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable that disables animated progress output.
pub const NO_PROGRESS_ENV: &str = "NAPCAT_NO_PROGRESS";

/// Resolution of the rendered bar; ratios are scaled to this many steps.
const BAR_STEPS: u64 = 1000;

fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A progress value: a known completion ratio or "working, total unknown".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Total amount of work unknown; render as busy/indeterminate.
    Indeterminate,
    /// Completion ratio in `[0, 1]`.
    Ratio(f64),
}

impl Progress {
    /// Completed work.
    pub const DONE: Self = Self::Ratio(1.0);

    /// Build a ratio from processed and total byte counts.
    ///
    /// A zero total yields [`Progress::Indeterminate`]. The ratio is clamped
    /// to `[0, 1]` so overshooting counters never render past completion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use napcat_installer::utils::progress::Progress;
    ///
    /// assert_eq!(Progress::from_bytes(50, 200), Progress::Ratio(0.25));
    /// assert_eq!(Progress::from_bytes(300, 200), Progress::Ratio(1.0));
    /// assert_eq!(Progress::from_bytes(10, 0), Progress::Indeterminate);
    /// ```
    #[must_use]
    pub fn from_bytes(processed: u64, total: u64) -> Self {
        if total == 0 {
            return Self::Indeterminate;
        }
        Self::ratio(processed as f64 / total as f64)
    }

    /// Build a ratio, clamping it to `[0, 1]`. NaN maps to `0`.
    #[must_use]
    pub fn ratio(value: f64) -> Self {
        if value.is_nan() {
            return Self::Ratio(0.0);
        }
        Self::Ratio(value.clamp(0.0, 1.0))
    }

    /// The ratio, if known.
    #[must_use]
    pub const fn as_ratio(self) -> Option<f64> {
        match self {
            Self::Indeterminate => None,
            Self::Ratio(value) => Some(value),
        }
    }
}

/// Observer of installer progress.
///
/// This is the capability the pipeline receives at construction instead of
/// reaching for a global UI handle. All methods are fire-and-forget.
///
/// Implementations must be `Send + Sync`: archive extraction reports progress
/// from tokio's blocking pool.
pub trait ProgressSink: Send + Sync {
    /// Replace the headline (e.g. "Updating NapCat").
    fn set_title(&self, title: &str);

    /// Replace the status line under the title.
    fn set_status(&self, status: &str);

    /// Update the progress indicator.
    fn set_progress(&self, progress: Progress);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarMode {
    Bar,
    Spinner,
}

/// Terminal renderer for [`ProgressSink`] built on `indicatif`.
///
/// The title is rendered as the bar prefix and the status as its message.
/// Switching between a known ratio and [`Progress::Indeterminate`] swaps
/// between bar and spinner styles.
///
/// # Examples
///
/// ```rust,no_run
/// use napcat_installer::utils::progress::{Progress, ProgressSink, TerminalProgress};
///
/// let progress = TerminalProgress::new();
/// progress.set_title("Installing NapCat");
/// progress.set_status("Downloading archive...");
/// progress.set_progress(Progress::Ratio(0.4));
/// progress.finish();
/// ```
pub struct TerminalProgress {
    inner: IndicatifBar,
    mode: Mutex<BarMode>,
    hidden: bool,
}

impl TerminalProgress {
    /// Create a terminal progress display, hidden when progress is disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_no_progress(false)
    }

    /// Create a display that is hidden if `no_progress` is set or
    /// `NAPCAT_NO_PROGRESS` is present in the environment.
    ///
    /// While hidden, titles and status lines are logged at `info` level
    /// instead of being drawn.
    #[must_use]
    pub fn with_no_progress(no_progress: bool) -> Self {
        let hidden = no_progress || is_progress_disabled();
        let inner = if hidden {
            IndicatifBar::hidden()
        } else {
            IndicatifBar::new(BAR_STEPS)
        };
        inner.set_style(spinner_style());
        inner.enable_steady_tick(Duration::from_millis(100));

        Self {
            inner,
            mode: Mutex::new(BarMode::Spinner),
            hidden,
        }
    }

    /// Stop animating and leave the last title and status on screen.
    pub fn finish(&self) {
        self.inner.disable_steady_tick();
        self.inner.abandon();
    }

    fn log(&self, line: &str) {
        if self.hidden {
            info!("{line}");
        } else {
            debug!("{line}");
        }
    }

    fn switch_mode(&self, wanted: BarMode) {
        let Ok(mut mode) = self.mode.lock() else {
            return;
        };
        if *mode == wanted {
            return;
        }

        match wanted {
            BarMode::Bar => {
                self.inner.disable_steady_tick();
                self.inner.set_style(bar_style());
            }
            BarMode::Spinner => {
                self.inner.set_style(spinner_style());
                self.inner.enable_steady_tick(Duration::from_millis(100));
            }
        }
        *mode = wanted;
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn set_title(&self, title: &str) {
        self.log(title);
        self.inner.set_prefix(title.to_string());
    }

    fn set_status(&self, status: &str) {
        self.log(status);
        self.inner.set_message(status.to_string());
    }

    fn set_progress(&self, progress: Progress) {
        match progress {
            Progress::Indeterminate => self.switch_mode(BarMode::Spinner),
            Progress::Ratio(value) => {
                self.switch_mode(BarMode::Bar);
                self.inner.set_position((value * BAR_STEPS as f64).round() as u64);
            }
        }
    }
}

fn bar_style() -> IndicatifStyle {
    IndicatifStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
        .map(|style| style.progress_chars("━╸━"))
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::with_template("{prefix:.bold} {spinner:.cyan} {msg}")
        .map(|style| style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]))
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
}
