//! Itinerary pane: the scrollable list of step cards.
//!
//! Cards are pre-wrapped to the pane width so every card's height is known
//! exactly; those heights are what the scroll-spy measures.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use waymark_core::scroll_spy::{ElementRect, Viewport};
use waymark_shared::ItineraryStep;

/// Description lines shown per card before it is cut.
const MAX_DESCRIPTION_LINES: usize = 3;

/// Position of one card inside the full (unscrolled) list, in rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CardLayout {
    pub index: usize,
    pub top: u16,
    pub height: u16,
}

pub(crate) struct ItineraryPane {
    /// Current scroll offset in rows (fractional while animating).
    scroll: f64,
    /// Where a smooth scroll is heading, if one is running.
    target: Option<f64>,
    /// Keyboard cursor.
    pub selected: usize,
    /// Inner width/height of the pane at the last draw.
    width: u16,
    height: u16,
    cards: Vec<CardLayout>,
}

impl ItineraryPane {
    pub(crate) fn new() -> Self {
        Self {
            scroll: 0.0,
            target: None,
            selected: 0,
            width: 0,
            height: 0,
            cards: Vec::new(),
        }
    }

    /// Recompute card heights for a new pane size.
    pub(crate) fn resize(&mut self, steps: &[ItineraryStep], area: Rect) {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        if inner.width == self.width && inner.height == self.height && !self.cards.is_empty() {
            return;
        }
        self.width = inner.width;
        self.height = inner.height;
        self.cards = layout_cards(steps, inner.width);
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    pub(crate) fn viewport(&self) -> Viewport {
        Viewport {
            scroll_y: self.scroll,
            height: f64::from(self.height),
        }
    }

    /// Card rects relative to the top of the pane.
    pub(crate) fn rects(&self) -> Vec<ElementRect> {
        self.cards
            .iter()
            .map(|c| ElementRect {
                index: c.index,
                top: f64::from(c.top) - self.scroll,
                height: f64::from(c.height),
            })
            .collect()
    }

    fn content_height(&self) -> u16 {
        self.cards.last().map(|c| c.top + c.height).unwrap_or(0)
    }

    fn max_scroll(&self) -> f64 {
        f64::from(self.content_height().saturating_sub(self.height))
    }

    /// Manual scroll; cancels any running smooth scroll.
    pub(crate) fn scroll_by(&mut self, rows: f64) {
        self.target = None;
        self.scroll = (self.scroll + rows).clamp(0.0, self.max_scroll());
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.target = None;
        self.scroll = 0.0;
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        self.target = None;
        self.scroll = self.max_scroll();
    }

    pub(crate) fn page(&self) -> f64 {
        f64::from(self.height.max(2) - 1)
    }

    /// Start a smooth scroll that centers card `index`.
    pub(crate) fn scroll_into_view(&mut self, index: usize) {
        if let Some(card) = self.cards.iter().find(|c| c.index == index) {
            let centered = f64::from(card.top) - (f64::from(self.height) - f64::from(card.height)) / 2.0;
            self.target = Some(centered.clamp(0.0, self.max_scroll()));
        }
    }

    /// Advance the smooth scroll by one frame. Returns `true` while moving.
    pub(crate) fn animate(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let delta = target - self.scroll;
        if delta.abs() < 0.5 {
            self.scroll = target;
            self.target = None;
        } else {
            self.scroll += delta * 0.35;
        }
        true
    }

    /// Which card sits at a row inside the pane (for mouse clicks).
    pub(crate) fn card_at(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let content_row = f64::from(row - inner.y) + self.scroll;
        self.cards
            .iter()
            .find(|c| content_row >= f64::from(c.top) && content_row < f64::from(c.top + c.height))
            .map(|c| c.index)
    }

    pub(crate) fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        steps: &[ItineraryStep],
        active: Option<usize>,
        pinned: bool,
    ) {
        let mut lines: Vec<Line> = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            lines.extend(card_lines(step, index, self.width, active == Some(index), self.selected == index));
        }

        let title = if pinned {
            format!(" Itinerary ({}) · pinned ", steps.len())
        } else {
            format!(" Itinerary ({}) ", steps.len())
        };

        let list = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((self.scroll.round() as u16, 0));
        f.render_widget(list, area);
    }
}

/// Card heights for a given inner width.
pub(crate) fn layout_cards(steps: &[ItineraryStep], width: u16) -> Vec<CardLayout> {
    let mut top = 0u16;
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let height = card_lines(step, index, width, false, false).len() as u16;
            let card = CardLayout { index, top, height };
            top += height;
            card
        })
        .collect()
}

fn card_lines(
    step: &ItineraryStep,
    index: usize,
    width: u16,
    active: bool,
    selected: bool,
) -> Vec<Line<'static>> {
    let accent = if active { Color::Yellow } else { Color::DarkGray };
    let bar = Span::styled("▌ ", Style::default().fg(accent));
    let cursor = if selected { "▸" } else { " " };

    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if active {
        title_style = title_style.fg(Color::Yellow);
    }

    let mut lines = vec![Line::from(vec![
        bar.clone(),
        Span::raw(format!("{cursor}{:>2}. ", index + 1)),
        Span::styled(step.name.clone(), title_style),
        Span::styled(format!("  [{}]", step.badge()), Style::default().fg(Color::Cyan)),
    ])];

    if let Some(description) = &step.description {
        let text_width = usize::from(width.saturating_sub(6)).max(10);
        for row in wrap_text(description, text_width, MAX_DESCRIPTION_LINES) {
            lines.push(Line::from(vec![bar.clone(), Span::raw(format!("    {row}"))]));
        }
    }

    let mut meta = Vec::new();
    if let Some(duration) = step.duration() {
        meta.push(duration.to_string());
    }
    if let Some(mode) = step.transportation().and_then(|t| t.arrival_method) {
        meta.push(format!("{} {}", mode.glyph(), mode.label()));
    }
    if !step.gallery.is_empty() {
        meta.push(format!("{} photos", step.gallery.len()));
    }
    if step.location.is_none() {
        meta.push("not on map".into());
    }
    if !meta.is_empty() {
        lines.push(Line::from(vec![
            bar,
            Span::styled(format!("    {}", meta.join(" · ")), Style::default().fg(Color::DarkGray)),
        ]));
    }

    lines.push(Line::from(""));
    lines
}

/// Greedy word wrap, at most `max_lines` lines; the last one ends in `…`
/// when text was dropped.
pub(crate) fn wrap_text(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            if lines.len() + 1 == max_lines {
                truncated = true;
                break;
            }
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        if truncated {
            let keep: String = current.chars().take(width.saturating_sub(1)).collect();
            current = format!("{}…", keep.trim_end());
        }
        lines.push(current);
    }
    lines
}
