//! Output / error surface
//!
//! Draws whichever of the two surfaces the display state makes visible.
//! Server text always passes through `render_text`.

use crate::action::Action;
use crate::component::Component;
use crate::model::display::render_text;
use crate::model::{DisplayState, RenderMode};
use anyhow::Result;
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

#[derive(Debug, Default)]
pub struct ResultPanel {
    pub scroll_offset: usize,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn draw_with_state(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        display: &DisplayState,
        render_mode: RenderMode,
    ) -> Result<()> {
        let (title, color, lines) = match display {
            DisplayState::Idle => (
                " Output ".to_string(),
                Color::DarkGray,
                vec![Line::from(Span::styled(
                    "Press Ctrl+R to compile",
                    Style::default().fg(Color::DarkGray),
                ))],
            ),
            DisplayState::Output(output) => (
                format!(" Output [{}] ", render_mode.name()),
                Color::Green,
                text_lines(&render_text(output, render_mode)),
            ),
            DisplayState::Error(detail) => (
                format!(" Error [{}] ", render_mode.name()),
                Color::Red,
                text_lines(&render_text(detail, render_mode))
                    .into_iter()
                    .map(|line| line.style(Style::default().fg(Color::Red)))
                    .collect(),
            ),
        };

        let total = lines.len();
        let visible_height = area.height.saturating_sub(2) as usize;
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let mut paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(color)),
            )
            .scroll((scroll_rows(self.scroll_offset), 0));

        // Assembly keeps its column layout; error messages wrap
        if display.is_error_visible() {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }

        frame.render_widget(paragraph, area);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(self.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Paragraph scroll is `u16`; saturate instead of wrapping on huge outputs
fn scroll_rows(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn text_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| Line::from(line.to_string()))
        .collect()
}

impl Component for ResultPanel {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            Action::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
            Action::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(20);
            }
            Action::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(20);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the display state, see draw_with_state
        Ok(())
    }
}
