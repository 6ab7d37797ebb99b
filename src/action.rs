//! Action enum - All possible application actions
//!
//! Components turn key events into Actions; the App applies them.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick; drains finished background work
    Tick,
    Resize(u16, u16),
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Compile
    // ─────────────────────────────────────────────────────────────────────────
    /// Submit the current source text
    Compile,
    /// Drop the responses of every in-flight compile
    CancelCompiles,
    /// Switch between sanitized and raw rendering of server text
    ToggleRenderMode,
    /// Switch the resolution policy for overlapping compiles
    TogglePolicy,
    /// Persist render mode and policy to the config file
    SaveConfig,

    // ─────────────────────────────────────────────────────────────────────────
    // Focus & Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    FocusNext,
    /// Scroll the result panel
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Examples
    // ─────────────────────────────────────────────────────────────────────────
    NextExample,
    PrevExample,
    /// Copy the highlighted example into the editor
    SelectExample,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor
    // ─────────────────────────────────────────────────────────────────────────
    InsertChar(char),
    InsertNewline,
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    OpenHistory,
    CloseModal,
    ConfirmModal,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::Compile => write!(f, "Compile"),
            Action::CancelCompiles => write!(f, "CancelCompiles"),
            Action::ToggleRenderMode => write!(f, "ToggleRenderMode"),
            Action::TogglePolicy => write!(f, "TogglePolicy"),
            Action::SaveConfig => write!(f, "SaveConfig"),
            Action::FocusNext => write!(f, "FocusNext"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::NextExample => write!(f, "NextExample"),
            Action::PrevExample => write!(f, "PrevExample"),
            Action::SelectExample => write!(f, "SelectExample"),
            Action::InsertChar(c) => write!(f, "InsertChar({:?})", c),
            Action::InsertNewline => write!(f, "InsertNewline"),
            Action::Backspace => write!(f, "Backspace"),
            Action::Delete => write!(f, "Delete"),
            Action::CursorLeft => write!(f, "CursorLeft"),
            Action::CursorRight => write!(f, "CursorRight"),
            Action::CursorUp => write!(f, "CursorUp"),
            Action::CursorDown => write!(f, "CursorDown"),
            Action::CursorHome => write!(f, "CursorHome"),
            Action::CursorEnd => write!(f, "CursorEnd"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenHistory => write!(f, "OpenHistory"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
        }
    }
}
