//! Status line and key hint bar drawn under the main panels

use crate::model::ui::Focus;
use crate::model::RenderMode;
use crate::services::{LoadState, ResolutionPolicy};
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the status line reports
pub struct StatusContext<'a> {
    pub endpoint: &'a str,
    pub in_flight: usize,
    pub policy: ResolutionPolicy,
    pub render_mode: RenderMode,
    pub examples: LoadState,
    pub last_resolved_at: Option<DateTime<Local>>,
    pub error: Option<&'a str>,
    pub status_message: Option<&'a str>,
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &StatusContext) {
    frame.render_widget(Paragraph::new(status_line(ctx)), area);
}

fn status_line(ctx: &StatusContext) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", ctx.endpoint),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    if ctx.in_flight > 0 {
        spans.push(Span::styled(
            format!(" compiling… ({}) ", ctx.in_flight),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }

    let mut settings = vec![ctx.policy.name().to_string(), ctx.render_mode.name().to_string()];
    if ctx.examples == LoadState::Loading {
        settings.push("loading examples".to_string());
    }
    if let Some(at) = ctx.last_resolved_at {
        settings.push(format!("last {}", at.format("%H:%M:%S")));
    }
    spans.push(Span::styled(
        settings.join(" · "),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some(error) = ctx.error {
        spans.push(Span::styled(
            format!("  Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!("  {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

fn key_span(key: &'static str, color: Color) -> Span<'static> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

pub fn render_help_bar(frame: &mut Frame, area: Rect, focus: Focus) {
    let mut spans = vec![
        key_span(" ^R ", Color::Green),
        Span::raw("Compile "),
        key_span(" ^X ", Color::Yellow),
        Span::raw("Cancel "),
        key_span(" Tab ", Color::Cyan),
        Span::raw(format!("Focus: {} ", focus.name())),
    ];

    if focus == Focus::Examples {
        spans.push(key_span(" Enter ", Color::Green));
        spans.push(Span::raw("Load example "));
    }

    spans.extend([
        key_span(" F2 ", Color::Cyan),
        Span::raw("Raw "),
        key_span(" F3 ", Color::Magenta),
        Span::raw("History "),
        key_span(" F1 ", Color::White),
        Span::raw("Help "),
        key_span(" ^Q ", Color::Yellow),
        Span::raw("Quit"),
    ]);

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StatusContext<'static> {
        StatusContext {
            endpoint: "http://localhost:5000",
            in_flight: 0,
            policy: ResolutionPolicy::LastResponseWins,
            render_mode: RenderMode::Sanitized,
            examples: LoadState::Loaded(2),
            last_resolved_at: None,
            error: None,
            status_message: None,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_status_shows_in_flight_count() {
        let idle = text(&status_line(&ctx()));
        assert!(!idle.contains("compiling"));

        let busy = StatusContext {
            in_flight: 2,
            ..ctx()
        };
        assert!(text(&status_line(&busy)).contains("compiling… (2)"));
    }

    #[test]
    fn test_error_takes_precedence_over_status() {
        let both = StatusContext {
            error: Some("boom"),
            status_message: Some("Saved"),
            ..ctx()
        };
        let line = text(&status_line(&both));
        assert!(line.contains("Error: boom"));
        assert!(!line.contains("Saved"));
    }
}
