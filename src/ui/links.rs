// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Reference link list widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use super::LinkField;
use crate::chart::ReferenceLink;

/// Widget listing reference links as `label: url`
pub struct LinksWidget<'a> {
    links: &'a [ReferenceLink],
    selected: Option<(usize, LinkField)>,
    block: Option<Block<'a>>,
}

impl<'a> LinksWidget<'a> {
    pub fn new(links: &'a [ReferenceLink]) -> Self {
        Self {
            links,
            selected: None,
            block: None,
        }
    }

    /// Set selected link and field
    pub fn selected(mut self, selected: Option<(usize, LinkField)>) -> Self {
        self.selected = selected;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for LinksWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.links.is_empty() {
            Paragraph::new("No reference links (l: add)")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        // Keep the selected row in view
        let visible = area.height.max(1) as usize;
        let selected = self.selected.map(|(i, _)| i).unwrap_or(0);
        let first = selected.saturating_sub(visible - 1);

        let lines: Vec<Line> = self
            .links
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(index, link)| {
                let field = match self.selected {
                    Some((i, field)) if i == index => Some(field),
                    _ => None,
                };
                let style = |f: LinkField, base: Style| {
                    if field == Some(f) {
                        base.add_modifier(Modifier::REVERSED)
                    } else {
                        base
                    }
                };
                let url = if link.url.is_empty() { "Link" } else { link.url.as_str() };
                Line::from(vec![
                    Span::styled(
                        format!("{}:", link.label),
                        style(LinkField::Label, Style::default().add_modifier(Modifier::BOLD)),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        url.to_string(),
                        style(LinkField::Url, Style::default().fg(Color::Blue)),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::LinkId;

    fn link(id: &str, label: &str, url: &str) -> ReferenceLink {
        let mut link = ReferenceLink::new(LinkId::from(id));
        link.label = label.to_string();
        link.url = url.to_string();
        link
    }

    fn render(widget: LinksWidget, height: u16) -> String {
        let area = Rect::new(0, 0, 60, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_empty_links() {
        let text = render(LinksWidget::new(&[]), 1);
        assert!(text.contains("No reference links"));
    }

    #[test]
    fn test_link_rows() {
        let links = vec![link("l1", "Spotify", "https://s"), link("l2", "YouTube", "")];
        let text = render(LinksWidget::new(&links), 2);
        assert!(text.contains("Spotify: https://s"));
        assert!(text.contains("YouTube: Link"));
    }

    #[test]
    fn test_scrolls_to_selection() {
        let links = vec![link("l1", "A", "a"), link("l2", "B", "b"), link("l3", "C", "c")];
        let text = render(
            LinksWidget::new(&links).selected(Some((2, LinkField::Url))),
            1,
        );
        assert!(text.contains("C: c"));
        assert!(!text.contains("A: a"));
    }
}
