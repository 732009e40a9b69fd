//! The log-sink seam for sync activities.

use parking_lot::Mutex;
use tracing::{error, info};

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// Informational.
    Info,
    /// Error.
    Error,
}

/// Sink for the fixed log lines emitted by sync activities.
///
/// Each terminal branch of a sync round emits exactly one line through
/// this seam; monitoring and tests treat those lines as an observable
/// contract, so production forwards them to `tracing` while tests
/// record them verbatim.
pub trait SyncReporter: Send + Sync {
    /// Reports an informational line.
    fn info(&self, message: &str);

    /// Reports an error line.
    fn error(&self, message: &str);
}

/// The production reporter, forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// A reporter that records lines verbatim, for tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded lines in order.
    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines.lock().clone()
    }

    /// Returns the last recorded line, if any.
    pub fn last(&self) -> Option<(ReportLevel, String)> {
        self.lines.lock().last().cloned()
    }

    /// Clears the recorded lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl SyncReporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.lines
            .lock()
            .push((ReportLevel::Info, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines
            .lock()
            .push((ReportLevel::Error, message.to_string()));
    }
}
