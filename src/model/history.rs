//! In-memory history of resolved compile requests

use super::compile::RequestId;
use chrono::{DateTime, Local};

/// Maximum number of entries kept
pub const HISTORY_LIMIT: usize = 50;

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Output-visible was entered
    Output,
    /// Error-visible was entered
    Error,
    /// Resolved, but a newer request had already been applied
    Superseded,
    /// Never reached a display state (transport or malformed response)
    Failed,
}

/// A single entry in the compile history
#[derive(Debug, Clone)]
pub struct CompileHistoryEntry {
    pub timestamp: DateTime<Local>,
    pub request: RequestId,
    pub outcome: CompileOutcome,
    /// First line of the output, error detail or failure reason
    pub summary: String,
    pub duration_secs: f64,
}

impl CompileHistoryEntry {
    pub fn status_icon(&self) -> &str {
        match self.outcome {
            CompileOutcome::Output => "✓",
            CompileOutcome::Error => "✗",
            CompileOutcome::Superseded => "↷",
            CompileOutcome::Failed => "!",
        }
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn formatted_duration(&self) -> String {
        if self.duration_secs < 1.0 {
            format!("{:.0}ms", self.duration_secs * 1000.0)
        } else if self.duration_secs < 60.0 {
            format!("{:.1}s", self.duration_secs)
        } else {
            let mins = (self.duration_secs / 60.0).floor();
            let secs = self.duration_secs % 60.0;
            format!("{}m {:.0}s", mins, secs)
        }
    }
}

/// Newest-first list of resolved compiles, capped at `HISTORY_LIMIT`
#[derive(Debug, Default)]
pub struct CompileHistory {
    entries: Vec<CompileHistoryEntry>,
}

impl CompileHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: CompileHistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[CompileHistoryEntry] {
        &self.entries
    }

}
