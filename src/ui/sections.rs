// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Section card widgets.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::SectionField;
use crate::chart::{ChartSection, SectionType};

/// Card width in cells
const CARD_WIDTH: u16 = 30;
/// Card height in cells, borders included
const CARD_HEIGHT: u16 = 6;

/// Place cards left to right, top to bottom, scrolled so `selected` is visible.
///
/// Returns the index and area of every card that fits.
pub fn card_grid(area: Rect, count: usize, selected: usize) -> Vec<(usize, Rect)> {
    if count == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }

    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let width = (area.width / columns as u16).max(1);
    let height = CARD_HEIGHT.min(area.height);

    let selected_row = selected.min(count - 1) / columns;
    let first_row = selected_row.saturating_sub(rows - 1);

    (first_row * columns..count)
        .take(rows * columns)
        .map(|index| {
            let row = (index / columns - first_row) as u16;
            let column = (index % columns) as u16;
            let rect = Rect::new(
                area.x + column * width,
                area.y + row * height,
                width,
                height,
            );
            (index, rect)
        })
        .collect()
}

/// Widget for displaying the song structure as cards
pub struct SectionsWidget<'a> {
    sections: &'a [ChartSection],
    selected: Option<usize>,
    field: Option<SectionField>,
    marked: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> SectionsWidget<'a> {
    /// Create a new sections widget
    pub fn new(sections: &'a [ChartSection]) -> Self {
        Self {
            sections,
            selected: None,
            field: None,
            marked: None,
            block: None,
        }
    }

    /// Set selected card and, when focused, its highlighted field
    pub fn selected(mut self, index: Option<usize>, field: Option<SectionField>) -> Self {
        self.selected = index;
        self.field = field;
        self
    }

    /// Set the card picked up for reordering
    pub fn marked(mut self, index: Option<usize>) -> Self {
        self.marked = index;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for SectionsWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.sections.is_empty() {
            Paragraph::new("No sections (a: add)")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let selected = self.selected.unwrap_or(0);
        for (index, rect) in card_grid(area, self.sections.len(), selected) {
            let is_selected = self.selected == Some(index);
            let field = if is_selected { self.field } else { None };
            render_card(
                rect,
                buf,
                index,
                &self.sections[index],
                is_selected,
                field,
                self.marked == Some(index),
            );
        }
    }
}

/// Render a single section card
fn render_card(
    area: Rect,
    buf: &mut Buffer,
    index: usize,
    section: &ChartSection,
    selected: bool,
    field: Option<SectionField>,
    marked: bool,
) {
    let border = if marked {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = format!(" {:02} {} ", index + 1, section.display_label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, border));
    let inner = block.inner(area);
    block.render(area, buf);

    let highlight = |f: SectionField, style: Style| {
        if field == Some(f) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    };

    let notation = section.notation.lines().next().unwrap_or("");
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}x", section.measures),
            highlight(SectionField::Measures, Style::default().fg(Color::Cyan)),
        )),
        Line::from(Span::styled(
            notation.to_string(),
            highlight(
                SectionField::Notation,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        )),
        Line::from(Span::styled(
            format!("> {}", section.cues),
            highlight(
                SectionField::Cues,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ),
        )),
    ];
    if section.kind == SectionType::Custom || field == Some(SectionField::Label) {
        let label = section.custom_label.as_deref().unwrap_or("");
        lines.push(Line::from(Span::styled(
            format!("label: {}", label),
            highlight(SectionField::Label, Style::default().fg(Color::DarkGray)),
        )));
    }

    Paragraph::new(lines).render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::SectionId;

    #[test]
    fn test_grid_layout() {
        let area = Rect::new(0, 0, 90, 12);
        let cards = card_grid(area, 5, 0);
        // Three columns, two rows
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].1, Rect::new(0, 0, 30, 6));
        assert_eq!(cards[2].1, Rect::new(60, 0, 30, 6));
        assert_eq!(cards[3].1, Rect::new(0, 6, 30, 6));
    }

    #[test]
    fn test_grid_scrolls_to_selection() {
        let area = Rect::new(0, 0, 60, 6);
        // Two columns, one visible row
        let cards = card_grid(area, 7, 5);
        let indices: Vec<usize> = cards.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![4, 5]);
        assert_eq!(cards[0].1.y, 0);
    }

    #[test]
    fn test_grid_empty() {
        assert!(card_grid(Rect::new(0, 0, 60, 6), 0, 0).is_empty());
        assert!(card_grid(Rect::new(0, 0, 0, 0), 3, 0).is_empty());
    }

    #[test]
    fn test_render_cards() {
        let sections = vec![
            ChartSection::new(SectionId::from("s1"), SectionType::Intro, 4)
                .with_notation("Am | G | F | E7"),
            ChartSection::new(SectionId::from("s2"), SectionType::Chorus, 8),
        ];
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        SectionsWidget::new(&sections)
            .selected(Some(1), Some(SectionField::Measures))
            .render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("01 Intro"));
        assert!(text.contains("02 Refrão"));
        assert!(text.contains("Am | G | F | E7"));
        assert!(text.contains("8x"));
    }
}
