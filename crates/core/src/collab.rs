//! Seams to the collaborators around a receipt.
//!
//! The workflow tells the operator what happened through a [`Notifier`] and
//! hands finished label batches to a [`LabelPrinter`]. Both are owned by
//! whoever drives the workflow.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::labels::PrintJob;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// An action completed.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// An action failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Shows messages to the operator.
pub trait Notifier {
    /// Show `message` with the given severity.
    fn notify(&self, severity: Severity, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, severity: Severity, message: &str) {
        (**self).notify(severity, message);
    }
}

/// Errors a label printer can report.
#[derive(thiserror::Error, Debug)]
pub enum PrintError {
    /// Writing the rendered labels failed.
    #[error("failed to write labels: {0}")]
    Io(#[from] std::io::Error),

    /// The printer could not render the job.
    #[error("failed to render labels: {0}")]
    Render(String),
}

/// Renders and prints label batches.
pub trait LabelPrinter {
    /// Print every record in `job`.
    ///
    /// # Errors
    ///
    /// Returns a [`PrintError`] when the job could not be rendered or written.
    fn print(&self, job: &PrintJob) -> Result<(), PrintError>;
}

impl<P: LabelPrinter + ?Sized> LabelPrinter for &P {
    fn print(&self, job: &PrintJob) -> Result<(), PrintError> {
        (**self).print(job)
    }
}
