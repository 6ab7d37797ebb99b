//! History dialog component
//!
//! Lists resolved compiles, newest first, with details for the selected one.

use crate::action::Action;
use crate::component::Component;
use crate::model::display::sanitize;
use crate::model::{CompileHistoryEntry, CompileOutcome};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct HistoryDialog {
    pub selected_index: usize,
}

impl Component for HistoryDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index = self.selected_index.saturating_add(1);
                None
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(3) => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the history entries, see draw_with_history
        Ok(())
    }
}

impl HistoryDialog {
    pub fn draw_with_history(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        history: &[CompileHistoryEntry],
    ) -> Result<()> {
        let margin = 2;
        let overlay_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );
        frame.render_widget(Clear, overlay_area);

        let title_style = Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD);

        if history.is_empty() {
            let paragraph = Paragraph::new("No compiles yet. Press Ctrl+R to compile the source.")
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Compile History ")
                        .title_style(title_style),
                );
            frame.render_widget(paragraph, overlay_area);
            return Ok(());
        }

        self.selected_index = self.selected_index.min(history.len() - 1);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(overlay_area);

        let items: Vec<ListItem> = history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == self.selected_index {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", entry.status_icon()),
                        Style::default().fg(outcome_color(entry.outcome)),
                    ),
                    Span::styled(
                        format!("{} ", entry.formatted_time()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entry.request.to_string()),
                ]))
                .style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" History ({}) ", history.len()))
                .title_style(title_style),
        );
        frame.render_widget(list, chunks[0]);

        let entry = &history[self.selected_index];
        let detail = Paragraph::new(history_detail(entry))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Details ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(detail, chunks[1]);

        Ok(())
    }
}

fn outcome_color(outcome: CompileOutcome) -> Color {
    match outcome {
        CompileOutcome::Output => Color::Green,
        CompileOutcome::Error => Color::Red,
        CompileOutcome::Superseded => Color::DarkGray,
        CompileOutcome::Failed => Color::Yellow,
    }
}

fn history_detail(entry: &CompileHistoryEntry) -> Vec<Line<'static>> {
    let label = |name: &str| {
        Span::styled(
            format!("{name}: "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    vec![
        Line::from(vec![label("Request"), Span::raw(entry.request.to_string())]),
        Line::from(vec![
            label("Time"),
            Span::raw(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]),
        Line::from(vec![label("Duration"), Span::raw(entry.formatted_duration())]),
        Line::from(vec![
            label("Outcome"),
            Span::styled(
                format!("{} {:?}", entry.status_icon(), entry.outcome),
                Style::default().fg(outcome_color(entry.outcome)),
            ),
        ]),
        Line::from(""),
        Line::from(sanitize(&entry.summary).into_owned()),
    ]
}
