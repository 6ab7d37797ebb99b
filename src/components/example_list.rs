//! Example selector component

use crate::action::Action;
use crate::component::Component;
use crate::model::ExampleEntry;
use crate::services::LoadState;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

#[derive(Debug, Default)]
pub struct ExampleListComponent {
    pub list_state: ListState,
}

impl ExampleListComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn draw_with_entries(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        entries: &[ExampleEntry],
        load_state: LoadState,
        focused: bool,
    ) -> Result<()> {
        let border_color = if focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Examples ({}) ", entries.len()))
            .border_style(Style::default().fg(border_color));

        if entries.is_empty() {
            let hint = match load_state {
                LoadState::Loading => "Loading…",
                LoadState::Loaded(_) | LoadState::Failed => "No examples",
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return Ok(());
        }

        if self.list_state.selected().is_none() {
            self.list_state.select(Some(0));
        }

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| ListItem::new(Line::from(Span::raw(entry.label.clone()))))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
        Ok(())
    }
}

impl Component for ExampleListComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextExample),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevExample),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::SelectExample),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the loaded entries, see draw_with_entries
        Ok(())
    }
}
