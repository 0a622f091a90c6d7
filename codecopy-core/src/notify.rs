//! User-facing notifications raised by the orchestrator.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Notification {
    pub fn new(severity: Severity, summary: &str, detail: &str) -> Self {
        Notification {
            severity,
            summary: summary.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn nothing_to_copy() -> Self {
        Self::new(
            Severity::Warning,
            "No code available",
            "Please enter some code before copying.",
        )
    }

    pub fn copied() -> Self {
        Self::new(
            Severity::Success,
            "Copied successfully",
            "The code has been copied to your clipboard.",
        )
    }

    pub fn copy_failed() -> Self {
        Self::new(
            Severity::Error,
            "Copy failed",
            "An error occurred while copying the code. Please try again.",
        )
    }

    pub fn missing_dependency(dependency: &str, language: &str) -> Self {
        Self::new(
            Severity::Warning,
            "Missing Dependency",
            &format!("Language '{dependency}' required by '{language}' is not available."),
        )
    }

    pub fn language_load_failed(language: &str) -> Self {
        Self::new(
            Severity::Warning,
            "Language loading failed",
            &format!("Could not load language '{language}'. Falling back to plain text."),
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success | Severity::Info => log::info!("{notification}"),
            Severity::Warning => log::warn!("{notification}"),
            Severity::Error => log::error!("{notification}"),
        }
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.received.take()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}
