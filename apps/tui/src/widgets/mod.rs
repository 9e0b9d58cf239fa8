//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use waymark_shared::ItineraryStep;

/// Bottom status bar: the active step on the left, the last message after it.
pub(crate) fn status_bar<'a>(
    msg: &'a str,
    active: Option<&'a ItineraryStep>,
    pinned: bool,
) -> Paragraph<'a> {
    let mut spans = Vec::new();
    if let Some(step) = active {
        let marker = if pinned { "◉" } else { "○" };
        spans.push(Span::styled(
            format!(" {marker} {} ", step.name),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    spans.push(Span::raw(format!(" {msg}")));

    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White))
}
