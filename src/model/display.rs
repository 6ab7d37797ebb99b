//! Display state and the binding both services write through
//!
//! `DisplayState` makes the output/error surfaces mutually exclusive by
//! construction. Server-supplied text is stored verbatim; `render_text` is the
//! boundary that decides whether it reaches the terminal sanitized or raw.

use super::example::ExampleEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Which result surface is visible
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    /// Nothing has been compiled yet
    #[default]
    Idle,
    /// Output visible, error hidden
    Output(String),
    /// Error visible, output hidden
    Error(String),
}

impl DisplayState {
    pub fn output(&self) -> Option<&str> {
        match self {
            DisplayState::Output(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DisplayState::Error(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_error_visible(&self) -> bool {
        matches!(self, DisplayState::Error(_))
    }
}

/// UI surfaces the orchestrator and the example loader are allowed to touch
pub trait DisplayBinding {
    /// Enter Output-visible with `artifact`, hiding the error surface
    fn show_output(&mut self, artifact: &str);

    /// Enter Error-visible with `detail`, hiding the output surface
    fn show_error(&mut self, detail: &str);

    /// Append one option to the example selector
    fn append_example(&mut self, entry: ExampleEntry);

    /// Overwrite the source input
    fn set_source(&mut self, code: &str);
}

/// How server-supplied text is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Escape sequences and control characters are stripped
    #[default]
    Sanitized,
    /// Text goes to the terminal untouched
    Raw,
}

impl RenderMode {
    pub fn toggle(self) -> Self {
        match self {
            RenderMode::Sanitized => RenderMode::Raw,
            RenderMode::Raw => RenderMode::Sanitized,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RenderMode::Sanitized => "sanitized",
            RenderMode::Raw => "raw",
        }
    }
}

/// CSI sequences, OSC strings and two-byte escapes
static ESCAPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)|[@-Z\\-_])")
        .expect("escape sequence pattern is valid")
});

/// Strip terminal escape sequences and control characters, keeping newlines
/// and tabs.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t');
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let without_escapes = ESCAPE_REGEX.replace_all(text, "");
    Cow::Owned(
        without_escapes
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect(),
    )
}

pub fn render_text(text: &str, mode: RenderMode) -> Cow<'_, str> {
    match mode {
        RenderMode::Sanitized => sanitize(text),
        RenderMode::Raw => Cow::Borrowed(text),
    }
}
