//! Component trait - Interface for UI components
//!
//! Components own their presentation state (cursor, scroll, highlight) and
//! turn key events into Actions. Data they render, such as the source text or
//! the display state, lives in `Surfaces` and is handed in by the App.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

pub trait Component {
    /// Convert a key event into a semantic Action without changing state
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Update presentation state, optionally returning a follow-up Action
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Render into `area`
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
