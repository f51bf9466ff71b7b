// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Metronome bar widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use super::MetronomeState;
use crate::chart::TimeSignature;

/// Metronome widget showing run state, tempo and mute
pub struct MetronomeWidget<'a> {
    state: &'a MetronomeState,
    tempo: u32,
    time_signature: TimeSignature,
    block: Option<Block<'a>>,
}

impl<'a> MetronomeWidget<'a> {
    /// Create a new metronome widget
    pub fn new(state: &'a MetronomeState, tempo: u32, time_signature: TimeSignature) -> Self {
        Self {
            state,
            tempo,
            time_signature,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for MetronomeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12), // Run state
                Constraint::Length(2),  // Spacer
                Constraint::Length(10), // Tempo
                Constraint::Length(2),  // Spacer
                Constraint::Length(6),  // Time signature
                Constraint::Length(2),  // Spacer
                Constraint::Length(8),  // Mute
                Constraint::Min(0),     // Audio status
            ])
            .split(area);

        let (indicator, style) = if !self.state.running {
            ("■ STOPPED", Style::default().fg(Color::Yellow))
        } else if self.tempo == 0 {
            ("▶ NO TEMPO", Style::default().fg(Color::DarkGray))
        } else {
            ("▶ RUNNING", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        };
        Paragraph::new(indicator).style(style).render(chunks[0], buf);

        Paragraph::new(format!("{} BPM", self.tempo))
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[2], buf);

        Paragraph::new(self.time_signature.as_str())
            .style(Style::default().fg(Color::White))
            .render(chunks[4], buf);

        if self.state.muted {
            Paragraph::new("MUTED")
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .render(chunks[6], buf);
        }

        if !self.state.audio {
            Paragraph::new("no audio device")
                .style(Style::default().fg(Color::DarkGray))
                .render(chunks[7], buf);
        }
    }
}
