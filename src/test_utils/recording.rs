//! Recording implementations of the UI seams.

use std::sync::Mutex;

use crate::core::ErrorContext;
use crate::utils::dialog::ErrorDialog;
use crate::utils::progress::{Progress, ProgressSink};

/// One call made on a [`ProgressSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// [`ProgressSink::set_title`]
    Title(String),
    /// [`ProgressSink::set_status`]
    Status(String),
    /// [`ProgressSink::set_progress`]
    Progress(Progress),
}

/// [`ProgressSink`] that stores every call in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    /// All recorded calls, oldest first.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Titles in the order they were set.
    pub fn titles(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Title(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    /// Status lines in the order they were set.
    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Status(status) => Some(status),
                _ => None,
            })
            .collect()
    }

    /// Progress values in the order they were reported.
    pub fn progress_values(&self) -> Vec<Progress> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress(progress) => Some(progress),
                _ => None,
            })
            .collect()
    }

    /// Most recent title, if any.
    pub fn last_title(&self) -> Option<String> {
        self.titles().pop()
    }

    /// Most recent status line, if any.
    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    /// Most recent progress value, if any.
    pub fn last_progress(&self) -> Option<Progress> {
        self.progress_values().pop()
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressSink for RecordingProgress {
    fn set_title(&self, title: &str) {
        self.push(ProgressEvent::Title(title.to_string()));
    }

    fn set_status(&self, status: &str) {
        self.push(ProgressEvent::Status(status.to_string()));
    }

    fn set_progress(&self, progress: Progress) {
        self.push(ProgressEvent::Progress(progress));
    }
}

/// [`ErrorDialog`] that stores `(title, rendered report)` pairs instead of blocking.
#[derive(Debug, Default)]
pub struct RecordingDialog {
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingDialog {
    /// Every dialog shown so far.
    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().map(|shown| shown.clone()).unwrap_or_default()
    }
}

impl ErrorDialog for RecordingDialog {
    fn show_error(&self, title: &str, report: &ErrorContext) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push((title.to_string(), report.to_string()));
        }
    }
}
