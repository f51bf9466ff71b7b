// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chart header widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::chart::{MetadataField, SongChart};

/// Widget showing title, artist and the song settings
pub struct HeaderWidget<'a> {
    chart: &'a SongChart,
    selected: Option<MetadataField>,
    block: Option<Block<'a>>,
}

impl<'a> HeaderWidget<'a> {
    /// Create a new header widget
    pub fn new(chart: &'a SongChart) -> Self {
        Self {
            chart,
            selected: None,
            block: None,
        }
    }

    /// Set highlighted field
    pub fn selected(mut self, field: Option<MetadataField>) -> Self {
        self.selected = field;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn field(&self, field: MetadataField, style: Style) -> Vec<Span<'a>> {
        let value = match field {
            MetadataField::Tempo => format!("{} BPM", self.chart.tempo),
            _ => field.value(self.chart),
        };
        let value_style = if self.selected == Some(field) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        vec![
            Span::styled(format!("{}: ", field.label()), Style::default().fg(Color::DarkGray)),
            Span::styled(value, value_style),
            Span::raw("   "),
        ]
    }
}

impl Widget for HeaderWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let title_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let value_style = Style::default().fg(Color::Cyan);

        let mut first = self.field(MetadataField::Title, title_style);
        first.extend(self.field(MetadataField::Artist, title_style));

        let mut second = Vec::new();
        for field in [
            MetadataField::Tempo,
            MetadataField::TimeSignature,
            MetadataField::Feel,
            MetadataField::Genre,
        ] {
            second.extend(self.field(field, value_style));
        }

        Paragraph::new(vec![Line::from(first), Line::from(second)]).render(area, buf);
    }
}
