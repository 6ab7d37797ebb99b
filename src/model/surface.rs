//! In-memory UI surfaces backing the terminal widgets

use super::display::{DisplayBinding, DisplayState};
use super::example::ExampleEntry;
use super::source::SourceText;

/// Source input, result surfaces and example selector options
#[derive(Debug, Default)]
pub struct Surfaces {
    pub source: SourceText,
    pub display: DisplayState,
    pub examples: Vec<ExampleEntry>,
}

impl Surfaces {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayBinding for Surfaces {
    fn show_output(&mut self, artifact: &str) {
        self.display = DisplayState::Output(artifact.to_string());
    }

    fn show_error(&mut self, detail: &str) {
        self.display = DisplayState::Error(detail.to_string());
    }

    fn append_example(&mut self, entry: ExampleEntry) {
        self.examples.push(entry);
    }

    fn set_source(&mut self, code: &str) {
        self.source.overwrite(code);
    }
}
