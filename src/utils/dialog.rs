//! Fatal error surface.
//!
//! When the pipeline fails it hands the error report to an [`ErrorDialog`].
//! The terminal implementation prints the report and, when attached to an
//! interactive terminal, blocks until the user presses Enter, so the report
//! stays visible even when the installer was launched from a file manager.

use crate::core::ErrorContext;
use colored::Colorize;
use std::io::{BufRead, IsTerminal, Write};

/// Blocking presenter for a fatal installer error.
pub trait ErrorDialog: Send + Sync {
    /// Show `report` under `title` and return once the user dismissed it.
    fn show_error(&self, title: &str, report: &ErrorContext);
}

/// [`ErrorDialog`] that renders to stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalDialog {
    wait_for_ack: bool,
}

impl TerminalDialog {
    /// Create a dialog; `wait_for_ack` makes it pause for Enter on a TTY.
    #[must_use]
    pub const fn new(wait_for_ack: bool) -> Self {
        Self {
            wait_for_ack,
        }
    }
}

impl Default for TerminalDialog {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ErrorDialog for TerminalDialog {
    fn show_error(&self, title: &str, report: &ErrorContext) {
        eprintln!();
        eprintln!("{}", title.red().bold());
        report.display();

        let stdin = std::io::stdin();
        if !self.wait_for_ack || !stdin.is_terminal() {
            return;
        }

        eprint!("{}", "Press Enter to close...".dimmed());
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        let _ = stdin.lock().read_line(&mut line);
    }
}
