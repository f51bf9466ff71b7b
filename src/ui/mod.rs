// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal chart editor.
//!
//! Provides a ratatui-based interface with the chart header, the section
//! cards, reference links and a metronome bar. Every edit goes through the
//! chart store; the screen is redrawn from the store's current chart.

mod editor;
mod header;
mod links;
mod metronome;
mod sections;

pub use editor::Editor;
pub use header::HeaderWidget;
pub use links::LinksWidget;
pub use metronome::MetronomeWidget;
pub use sections::{card_grid, SectionsWidget};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::chart::{ChartSink, LinkId, MetadataField, SectionId};

/// Panel that receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Header,
    #[default]
    Sections,
    Links,
}

impl Focus {
    /// Next panel in tab order
    pub fn next(&self) -> Focus {
        match self {
            Focus::Header => Focus::Sections,
            Focus::Sections => Focus::Links,
            Focus::Links => Focus::Header,
        }
    }

    /// Previous panel in tab order
    pub fn previous(&self) -> Focus {
        match self {
            Focus::Header => Focus::Links,
            Focus::Sections => Focus::Header,
            Focus::Links => Focus::Sections,
        }
    }
}

/// Editable fields of a section card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionField {
    Measures,
    #[default]
    Notation,
    Cues,
    Label,
}

impl SectionField {
    /// Fields in card order
    pub const ALL: [SectionField; 4] = [
        SectionField::Measures,
        SectionField::Notation,
        SectionField::Cues,
        SectionField::Label,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SectionField::Measures => "Measures",
            SectionField::Notation => "Notation",
            SectionField::Cues => "Cues",
            SectionField::Label => "Label",
        }
    }
}

/// Editable fields of a link row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkField {
    #[default]
    Label,
    Url,
}

impl LinkField {
    pub fn label(&self) -> &'static str {
        match self {
            LinkField::Label => "Label",
            LinkField::Url => "URL",
        }
    }
}

/// Field being edited as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Metadata(MetadataField),
    Section(SectionId, SectionField),
    Link(LinkId, LinkField),
}

impl EditTarget {
    /// Caption shown while editing
    pub fn label(&self) -> &'static str {
        match self {
            EditTarget::Metadata(field) => field.label(),
            EditTarget::Section(_, field) => field.label(),
            EditTarget::Link(_, field) => field.label(),
        }
    }
}

/// Destructive actions that ask before running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPrompt {
    ClearSections,
    ResetChart,
}

impl ConfirmPrompt {
    pub fn question(&self) -> &'static str {
        match self {
            ConfirmPrompt::ClearSections => "Remove every section? (y/n)",
            ConfirmPrompt::ResetChart => "Reset the whole chart? (y/n)",
        }
    }
}

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into a field; Enter commits, Esc cancels
    Editing { target: EditTarget, buffer: String },
    /// Waiting for y/n
    Confirm(ConfirmPrompt),
}

/// Metronome state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetronomeState {
    /// Whether the tick loop runs
    pub running: bool,
    /// Whether clicks are silenced
    pub muted: bool,
    /// Whether an audio device is open
    pub audio: bool,
}

/// Editor view state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Focused panel
    pub focus: Focus,
    /// Selected header field (index into `MetadataField::ALL`)
    pub header_field: usize,
    /// Selected section index
    pub selected_section: usize,
    /// Selected field of the selected section
    pub section_field: SectionField,
    /// Selected link index
    pub selected_link: usize,
    /// Selected field of the selected link
    pub link_field: LinkField,
    /// Section picked up for a mark-and-drop reorder
    pub marked: Option<SectionId>,
    /// Input mode
    pub mode: Mode,
    /// Metronome display state
    pub metronome: MetronomeState,
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Selected header field
    pub fn metadata_field(&self) -> MetadataField {
        MetadataField::ALL[self.header_field.min(MetadataField::ALL.len() - 1)]
    }
}

/// Key event result for the caller to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing outside the editor to do
    None,
    /// Quit the application
    Quit,
    /// Start or stop the metronome
    ToggleMetronome,
    /// Mute or unmute the metronome
    ToggleMute,
    /// Write the print sheet
    Export,
}

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
}

impl App {
    /// Take over the terminal
    pub fn new(frame_rate: u32) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            frame_rate: frame_rate.clamp(1, 120),
        })
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw the editor
    pub fn draw<S: ChartSink>(&mut self, editor: &Editor<S>) -> io::Result<()> {
        self.terminal.draw(|frame| render_editor(frame, editor))?;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the whole editor into a frame
pub fn render_editor<S: ChartSink>(frame: &mut Frame, editor: &Editor<S>) {
    let area = frame.area();
    let state = editor.state();
    let chart = editor.chart();

    let links_height = (chart.links.len() as u16).clamp(1, 4) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),            // Header
            Constraint::Length(links_height), // Links
            Constraint::Min(6),               // Structure
            Constraint::Length(3),            // Metronome
            Constraint::Length(1),            // Status bar
        ])
        .split(area);

    let header_focus = (state.focus == Focus::Header).then(|| state.metadata_field());
    frame.render_widget(
        HeaderWidget::new(chart)
            .selected(header_focus)
            .block(panel(" Chart ", state.focus == Focus::Header)),
        chunks[0],
    );

    let link_focus = (state.focus == Focus::Links).then_some((state.selected_link, state.link_field));
    frame.render_widget(
        LinksWidget::new(&chart.links)
            .selected(link_focus)
            .block(panel(" Links ", state.focus == Focus::Links)),
        chunks[1],
    );

    let title = format!(" Structure ({} measures) ", chart.total_measures());
    let section_focus = (state.focus == Focus::Sections).then_some(state.section_field);
    let marked = state.marked.as_ref().and_then(|id| chart.section_index(id));
    frame.render_widget(
        SectionsWidget::new(&chart.sections)
            .selected(Some(state.selected_section), section_focus)
            .marked(marked)
            .block(panel(&title, state.focus == Focus::Sections)),
        chunks[2],
    );

    frame.render_widget(
        MetronomeWidget::new(&state.metronome, chart.tempo, chart.time_signature)
            .block(Block::default().borders(Borders::ALL).title(" Metronome ")),
        chunks[3],
    );

    render_status_bar(frame, chunks[4], state);

    if state.show_help {
        render_help_overlay(frame, area);
    }
}

/// Bordered panel, highlighted when focused
fn panel(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(Span::styled(title.to_string(), style))
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let line = match &state.mode {
        Mode::Editing { target, buffer } => Line::from(vec![
            Span::styled(
                format!(" {}: ", target.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(buffer.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Mode::Confirm(prompt) => Line::from(Span::styled(
            format!(" {}", prompt.question()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Mode::Normal => match state.status_message {
            Some(ref msg) => Line::from(Span::styled(
                format!(" {}", msg),
                Style::default().fg(Color::Yellow),
            )),
            None => Line::from(Span::styled(
                " Tab: Panel | e: Edit | a: Add | Space: Metronome | p: Print | h: Help | q: Quit",
                Style::default().fg(Color::DarkGray),
            )),
        },
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 62.min(area.width.saturating_sub(4));
    let height = 24.min(area.height.saturating_sub(2));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Navigation", bold)),
        Line::from("  Tab/S-Tab   Next/previous panel"),
        Line::from("  Arrows      Select section or field"),
        Line::from("  e/Enter     Edit field (Enter saves, Esc cancels)"),
        Line::from(""),
        Line::from(Span::styled("Structure", bold)),
        Line::from("  a / d / x   Add / duplicate / remove"),
        Line::from("  [ / ]       Move left / right"),
        Line::from("  m, M        Mark, then drop on selection"),
        Line::from("  + / -       Measures"),
        Line::from("  t / T       Next / previous type (header: time signature)"),
        Line::from("  C           Clear sections"),
        Line::from("  R           Reset chart"),
        Line::from(""),
        Line::from(Span::styled("Other", bold)),
        Line::from("  l           Add link"),
        Line::from("  Space / u   Metronome on/off / mute"),
        Line::from("  p           Export print sheet"),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
