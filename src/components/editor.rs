//! Source editor component
//!
//! Owns the cursor and vertical scroll; the text itself lives in `Surfaces`.

use crate::action::Action;
use crate::component::Component;
use crate::model::display::sanitize;
use crate::model::SourceText;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Default)]
pub struct EditorComponent {
    /// Byte offset into the source text
    pub cursor: usize,
    /// First visible line
    pub scroll_row: usize,
}

impl EditorComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the cursor after the last character
    pub fn move_to_end(&mut self, source: &SourceText) {
        self.cursor = source.len();
    }

    /// Apply an editing or cursor action to `source`
    pub fn apply(&mut self, action: &Action, source: &mut SourceText) {
        let cursor = source.clamp(self.cursor);
        self.cursor = match action {
            Action::InsertChar(c) => source.insert_char(cursor, *c),
            Action::InsertNewline => source.insert_char(cursor, '\n'),
            Action::Backspace => source.delete_before(cursor),
            Action::Delete => source.delete_at(cursor),
            Action::CursorLeft => source.prev_boundary(cursor),
            Action::CursorRight => source.next_boundary(cursor),
            Action::CursorUp => source.move_vertical(cursor, true),
            Action::CursorDown => source.move_vertical(cursor, false),
            Action::CursorHome => source.line_start(cursor),
            Action::CursorEnd => source.line_end(cursor),
            _ => cursor,
        };
    }

    pub fn draw_with_source(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        source: &SourceText,
        focused: bool,
    ) -> Result<()> {
        let (row, col) = source.cursor_position(self.cursor);
        let visible_rows = area.height.saturating_sub(2) as usize;

        // Keep the cursor line on screen
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if visible_rows > 0 && row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }

        let lines: Vec<Line> = source
            .as_str()
            .split('\n')
            .map(|line| Line::from(sanitize(line).into_owned()))
            .collect();

        let border_color = if focused { Color::Cyan } else { Color::DarkGray };
        let title = if source.is_empty() {
            " Source ".to_string()
        } else {
            format!(" Source ({} lines) ", lines.len())
        };

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(border_color).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(border_color)),
            )
            .scroll((u16::try_from(self.scroll_row).unwrap_or(u16::MAX), 0));

        frame.render_widget(paragraph, area);

        if focused {
            if let Some(position) = cursor_cell(area, row - self.scroll_row, col) {
                frame.set_cursor_position(position);
            }
        }

        Ok(())
    }
}

/// Screen cell for a cursor at `row` (relative to the first visible line) and
/// `col`, or `None` when it falls outside the text area
fn cursor_cell(area: Rect, row: usize, col: usize) -> Option<(u16, u16)> {
    let x = u16::try_from(col).ok()?.checked_add(area.x.checked_add(1)?)?;
    let y = u16::try_from(row).ok()?.checked_add(area.y.checked_add(1)?)?;
    let inside = x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1);
    inside.then_some((x, y))
}

impl Component for EditorComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+Alt together is AltGr on some platforms and still types text
        let altgr = key
            .modifiers
            .contains(KeyModifiers::CONTROL | KeyModifiers::ALT);
        if !altgr
            && key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Char(c) => Some(Action::InsertChar(c)),
            KeyCode::Enter => Some(Action::InsertNewline),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Delete => Some(Action::Delete),
            KeyCode::Left => Some(Action::CursorLeft),
            KeyCode::Right => Some(Action::CursorRight),
            KeyCode::Up => Some(Action::CursorUp),
            KeyCode::Down => Some(Action::CursorDown),
            KeyCode::Home => Some(Action::CursorHome),
            KeyCode::End => Some(Action::CursorEnd),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the source text, see draw_with_source
        Ok(())
    }
}
