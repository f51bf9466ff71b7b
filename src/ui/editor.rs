// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key handling for the chart editor.
//!
//! The editor owns the chart store and the view state. Keys that change the
//! chart are applied to the store here; keys that reach outside the editor
//! (metronome, export, quit) come back as a [`KeyAction`].

use crossterm::event::{KeyCode, KeyModifiers};

use crate::chart::{
    ChartSink, ChartStore, Direction, LinkUpdate, MetadataField, SectionId, SectionType,
    SectionUpdate, SongChart, TimeSignature,
};

use super::{ConfirmPrompt, EditTarget, Focus, KeyAction, LinkField, Mode, SectionField, UiState};

/// Chart editor: store plus view state
pub struct Editor<S: ChartSink> {
    store: ChartStore<S>,
    state: UiState,
}

impl<S: ChartSink> Editor<S> {
    /// Create an editor over a store
    pub fn new(store: ChartStore<S>) -> Self {
        Self {
            store,
            state: UiState::default(),
        }
    }

    pub fn store(&self) -> &ChartStore<S> {
        &self.store
    }

    /// Current chart
    pub fn chart(&self) -> &SongChart {
        self.store.chart()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    /// Id of the selected section
    pub fn selected_section(&self) -> Option<SectionId> {
        self.chart()
            .sections
            .get(self.state.selected_section)
            .map(|s| s.id.clone())
    }

    /// Handle a key event
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return KeyAction::Quit;
        }

        match self.state.mode {
            Mode::Editing { .. } => {
                self.handle_edit_key(code);
                KeyAction::None
            }
            Mode::Confirm(prompt) => {
                self.handle_confirm_key(prompt, code);
                KeyAction::None
            }
            Mode::Normal => self.handle_normal_key(code, modifiers),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        match code {
            KeyCode::Char('q') => return KeyAction::Quit,
            KeyCode::Char(' ') => return KeyAction::ToggleMetronome,
            KeyCode::Char('u') => return KeyAction::ToggleMute,
            KeyCode::Char('p') => return KeyAction::Export,

            // Panels
            KeyCode::Tab => self.state.focus = self.state.focus.next(),
            KeyCode::BackTab => self.state.focus = self.state.focus.previous(),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                self.navigate(code, modifiers)
            }

            // Editing
            KeyCode::Char('e') | KeyCode::Enter => self.begin_edit(),

            // Structure
            KeyCode::Char('a') => self.add_section(),
            KeyCode::Char('d') => self.duplicate_section(),
            KeyCode::Char('x') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('[') => self.move_section(Direction::Left),
            KeyCode::Char(']') => self.move_section(Direction::Right),
            KeyCode::Char('m') => self.mark_section(),
            KeyCode::Char('M') => self.drop_marked(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.update_selected(SectionUpdate::IncrementMeasures)
            }
            KeyCode::Char('-') => self.update_selected(SectionUpdate::DecrementMeasures),
            KeyCode::Char('t') if self.state.focus == Focus::Header => {
                self.cycle_time_signature(TimeSignature::next)
            }
            KeyCode::Char('T') if self.state.focus == Focus::Header => {
                self.cycle_time_signature(TimeSignature::previous)
            }
            KeyCode::Char('t') => self.cycle_kind(SectionType::next),
            KeyCode::Char('T') => self.cycle_kind(SectionType::previous),
            KeyCode::Char('C') => self.state.mode = Mode::Confirm(ConfirmPrompt::ClearSections),
            KeyCode::Char('R') => self.state.mode = Mode::Confirm(ConfirmPrompt::ResetChart),

            // Links
            KeyCode::Char('l') => self.add_link(),

            // Help
            KeyCode::Char('h') | KeyCode::Char('?') => self.state.show_help = !self.state.show_help,
            KeyCode::Esc => {
                self.state.show_help = false;
                self.state.marked = None;
            }

            _ => {}
        }
        KeyAction::None
    }

    fn navigate(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        let sections = self.chart().sections.len();
        let links = self.chart().links.len();
        let state = &mut self.state;

        match (state.focus, code) {
            (Focus::Header, KeyCode::Left) => {
                state.header_field = state.header_field.saturating_sub(1);
            }
            (Focus::Header, KeyCode::Right) => {
                state.header_field = (state.header_field + 1).min(MetadataField::ALL.len() - 1);
            }
            (Focus::Header, KeyCode::Down) => state.focus = Focus::Links,

            (Focus::Sections, KeyCode::Left) => {
                state.selected_section = state.selected_section.saturating_sub(1);
            }
            (Focus::Sections, KeyCode::Right) => {
                state.selected_section = (state.selected_section + 1).min(sections.saturating_sub(1));
            }
            (Focus::Sections, KeyCode::Up) => state.section_field = step_field(state.section_field, -1),
            (Focus::Sections, KeyCode::Down) => state.section_field = step_field(state.section_field, 1),

            (Focus::Links, KeyCode::Up) if state.selected_link == 0 => state.focus = Focus::Header,
            (Focus::Links, KeyCode::Up) => state.selected_link -= 1,
            (Focus::Links, KeyCode::Down) if state.selected_link + 1 >= links => {
                state.focus = Focus::Sections
            }
            (Focus::Links, KeyCode::Down) => state.selected_link += 1,
            (Focus::Links, KeyCode::Left) => state.link_field = LinkField::Label,
            (Focus::Links, KeyCode::Right) => state.link_field = LinkField::Url,

            _ => {}
        }
    }

    /// Open the focused field for typing
    fn begin_edit(&mut self) {
        let chart = self.store.chart();
        let (target, text) = match self.state.focus {
            Focus::Header => {
                let field = self.state.metadata_field();
                (EditTarget::Metadata(field), field.value(chart))
            }
            Focus::Sections => {
                let Some(section) = chart.sections.get(self.state.selected_section) else {
                    return;
                };
                let field = self.state.section_field;
                let text = match field {
                    SectionField::Measures => section.measures.to_string(),
                    SectionField::Notation => section.notation.clone(),
                    SectionField::Cues => section.cues.clone(),
                    SectionField::Label if section.kind != SectionType::Custom => {
                        self.state.set_status("Only custom sections have a label");
                        return;
                    }
                    SectionField::Label => section.custom_label.clone().unwrap_or_default(),
                };
                (EditTarget::Section(section.id.clone(), field), text)
            }
            Focus::Links => {
                let Some(link) = chart.links.get(self.state.selected_link) else {
                    return;
                };
                let field = self.state.link_field;
                let text = match field {
                    LinkField::Label => link.label.clone(),
                    LinkField::Url => link.url.clone(),
                };
                (EditTarget::Link(link.id.clone(), field), text)
            }
        };
        self.state.mode = Mode::Editing {
            target,
            buffer: text,
        };
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Mode::Editing { target, mut buffer } = std::mem::take(&mut self.state.mode) else {
            return;
        };

        match code {
            KeyCode::Enter => self.commit_edit(target, buffer),
            KeyCode::Esc => self.state.set_status("Edit cancelled"),
            KeyCode::Backspace => {
                buffer.pop();
                self.state.mode = Mode::Editing { target, buffer };
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.state.mode = Mode::Editing { target, buffer };
            }
            _ => self.state.mode = Mode::Editing { target, buffer },
        }
    }

    fn commit_edit(&mut self, target: EditTarget, text: String) {
        let changed = match &target {
            EditTarget::Metadata(field) => self.store.update_metadata(*field, &text),
            EditTarget::Section(id, field) => {
                let update = match field {
                    SectionField::Measures => SectionUpdate::MeasuresText(text),
                    SectionField::Notation => SectionUpdate::Notation(text),
                    SectionField::Cues => SectionUpdate::Cues(text),
                    SectionField::Label => SectionUpdate::CustomLabel(text),
                };
                self.store.update_section(id, update)
            }
            EditTarget::Link(id, field) => {
                let update = match field {
                    LinkField::Label => LinkUpdate::Label(text),
                    LinkField::Url => LinkUpdate::Url(text),
                };
                self.store.update_link(id, update)
            }
        };
        if changed {
            self.report(format!("{} saved", target.label()));
        } else if matches!(target, EditTarget::Metadata(MetadataField::TimeSignature)) {
            let offered: Vec<&str> = TimeSignature::ALL.iter().map(|s| s.as_str()).collect();
            self.state.set_status(format!(
                "Unknown time signature, not saved (use {})",
                offered.join(", ")
            ));
        } else {
            self.state.set_status("No change");
        }
    }

    fn handle_confirm_key(&mut self, prompt: ConfirmPrompt, code: KeyCode) {
        self.state.mode = Mode::Normal;
        let answer = matches!(code, KeyCode::Char('y') | KeyCode::Char('Y'));

        let confirmed = match prompt {
            ConfirmPrompt::ClearSections => self.store.clear_sections(|| answer),
            ConfirmPrompt::ResetChart => self.store.reset_chart(|| answer),
        };

        if confirmed {
            self.state.marked = None;
            self.clamp_selection();
            self.report(match prompt {
                ConfirmPrompt::ClearSections => "Sections cleared",
                ConfirmPrompt::ResetChart => "Chart reset",
            });
        } else {
            self.state.set_status("Cancelled");
        }
    }

    fn add_section(&mut self) {
        let id = self.store.add_section();
        self.select_section(&id);
        self.state.focus = Focus::Sections;
        self.report("Section added");
    }

    fn duplicate_section(&mut self) {
        let Some(id) = self.selected_section() else {
            return;
        };
        if let Some(copy) = self.store.duplicate_section(&id) {
            self.select_section(&copy);
            self.report("Section duplicated");
        }
    }

    fn remove_selected(&mut self) {
        let removed = match self.state.focus {
            Focus::Links => {
                let id = self
                    .chart()
                    .links
                    .get(self.state.selected_link)
                    .map(|l| l.id.clone());
                id.is_some_and(|id| self.store.remove_link(&id))
            }
            _ => {
                let id = self.selected_section();
                id.is_some_and(|id| {
                    if self.state.marked.as_ref() == Some(&id) {
                        self.state.marked = None;
                    }
                    self.store.remove_section(&id)
                })
            }
        };
        if removed {
            self.clamp_selection();
            self.report("Removed");
        }
    }

    fn move_section(&mut self, direction: Direction) {
        let Some(id) = self.selected_section() else {
            return;
        };
        if self.store.move_section(&id, direction) {
            self.select_section(&id);
            self.report("Section moved");
        }
    }

    fn mark_section(&mut self) {
        let Some(id) = self.selected_section() else {
            return;
        };
        let label = self
            .chart()
            .section(&id)
            .map(|s| s.display_label().to_string())
            .unwrap_or_default();
        self.state.marked = Some(id);
        self.state.set_status(format!("Picked up {}; select a slot and press M", label));
    }

    fn drop_marked(&mut self) {
        let Some(dragged) = self.state.marked.take() else {
            self.state.set_status("Press m on a section first");
            return;
        };
        let Some(target) = self.selected_section() else {
            return;
        };
        if self.store.reorder_sections(&dragged, &target) {
            self.select_section(&dragged);
            self.report("Section reordered");
        }
    }

    fn update_selected(&mut self, update: SectionUpdate) {
        let Some(id) = self.selected_section() else {
            return;
        };
        if self.store.update_section(&id, update) {
            self.report_persist();
        }
    }

    fn cycle_kind(&mut self, step: fn(&SectionType) -> SectionType) {
        let Some(kind) = self
            .chart()
            .sections
            .get(self.state.selected_section)
            .map(|s| s.kind)
        else {
            return;
        };
        self.update_selected(SectionUpdate::Kind(step(&kind)));
    }

    fn cycle_time_signature(&mut self, step: fn(&TimeSignature) -> TimeSignature) {
        let signature = step(&self.chart().time_signature);
        self.state.header_field = MetadataField::ALL
            .iter()
            .position(|f| *f == MetadataField::TimeSignature)
            .unwrap_or(self.state.header_field);
        if self
            .store
            .update_metadata(MetadataField::TimeSignature, signature.as_str())
        {
            self.report(format!("Time signature {}", signature));
        }
    }

    fn add_link(&mut self) {
        self.store.add_link();
        self.state.focus = Focus::Links;
        self.state.selected_link = self.chart().links.len().saturating_sub(1);
        self.state.link_field = LinkField::Label;
        self.report("Link added");
    }

    fn select_section(&mut self, id: &SectionId) {
        if let Some(index) = self.chart().section_index(id) {
            self.state.selected_section = index;
        }
    }

    fn clamp_selection(&mut self) {
        let sections = self.chart().sections.len();
        let links = self.chart().links.len();
        self.state.selected_section = self.state.selected_section.min(sections.saturating_sub(1));
        self.state.selected_link = self.state.selected_link.min(links.saturating_sub(1));
    }

    /// Status after a change, replaced by the persist error if saving failed
    fn report(&mut self, message: impl Into<String>) {
        match self.store.last_persist_error() {
            Some(err) => self.state.set_status(format!("Not saved: {}", err)),
            None => self.state.set_status(message),
        }
    }

    fn report_persist(&mut self) {
        if let Some(err) = self.store.last_persist_error() {
            self.state.set_status(format!("Not saved: {}", err));
        }
    }
}

fn step_field(field: SectionField, delta: isize) -> SectionField {
    let all = SectionField::ALL;
    let index = all.iter().position(|f| *f == field).unwrap_or(0) as isize;
    let next = (index + delta).rem_euclid(all.len() as isize) as usize;
    all[next]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartId, NullSink};

    fn editor() -> Editor<NullSink> {
        Editor::new(ChartStore::new(SongChart::empty(ChartId::from("c")), NullSink))
    }

    fn press(editor: &mut Editor<NullSink>, code: KeyCode) -> KeyAction {
        editor.handle_key(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut Editor<NullSink>, text: &str) {
        for c in text.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    fn labels(editor: &Editor<NullSink>) -> Vec<String> {
        editor
            .chart()
            .sections
            .iter()
            .map(|s| s.notation.clone())
            .collect()
    }

    #[test]
    fn test_outward_actions() {
        let mut e = editor();
        assert_eq!(press(&mut e, KeyCode::Char(' ')), KeyAction::ToggleMetronome);
        assert_eq!(press(&mut e, KeyCode::Char('u')), KeyAction::ToggleMute);
        assert_eq!(press(&mut e, KeyCode::Char('p')), KeyAction::Export);
        assert_eq!(press(&mut e, KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(
            e.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_add_selects_new_section() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('a'));
        assert_eq!(e.chart().sections.len(), 2);
        assert_eq!(e.state().selected_section, 1);
        assert_eq!(e.chart().sections[0].kind, SectionType::Verse1);
        assert_eq!(e.chart().sections[0].measures, 8);
    }

    #[test]
    fn test_edit_notation() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('e'));
        type_text(&mut e, "Am | G");
        press(&mut e, KeyCode::Backspace);
        type_text(&mut e, "C");
        assert_eq!(e.chart().sections[0].notation, "");

        press(&mut e, KeyCode::Enter);
        assert_eq!(e.chart().sections[0].notation, "Am | C");
        assert_eq!(e.state().mode, Mode::Normal);
    }

    #[test]
    fn test_edit_cancel() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        let revision = e.store().revision();
        press(&mut e, KeyCode::Enter);
        type_text(&mut e, "q a x");
        press(&mut e, KeyCode::Esc);

        assert_eq!(e.store().revision(), revision);
        assert_eq!(e.chart().sections.len(), 1);
        assert_eq!(e.chart().sections[0].notation, "");
    }

    #[test]
    fn test_edit_tempo_in_header() {
        let mut e = editor();
        press(&mut e, KeyCode::BackTab);
        assert_eq!(e.state().focus, Focus::Header);
        press(&mut e, KeyCode::Right);
        press(&mut e, KeyCode::Right);
        assert_eq!(e.state().metadata_field(), MetadataField::Tempo);

        press(&mut e, KeyCode::Char('e'));
        type_text(&mut e, "96");
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.chart().tempo, 96);
    }

    #[test]
    fn test_cycle_time_signature_in_header() {
        let mut e = editor();
        press(&mut e, KeyCode::BackTab);
        press(&mut e, KeyCode::Char('t'));
        assert_eq!(e.chart().time_signature, TimeSignature::ThreeFour);
        assert_eq!(e.state().metadata_field(), MetadataField::TimeSignature);

        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        assert_eq!(e.chart().time_signature, TimeSignature::SevenEight);
        assert_eq!(e.state().status_message.as_deref(), Some("Time signature 7/8"));
    }

    #[test]
    fn test_unknown_time_signature_reported() {
        let mut e = editor();
        press(&mut e, KeyCode::BackTab);
        for _ in 0..3 {
            press(&mut e, KeyCode::Right);
        }
        assert_eq!(e.state().metadata_field(), MetadataField::TimeSignature);

        press(&mut e, KeyCode::Enter);
        for _ in 0..3 {
            press(&mut e, KeyCode::Backspace);
        }
        type_text(&mut e, "9/8");
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.chart().time_signature, TimeSignature::FourFour);
        assert!(e
            .state()
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Unknown time signature")));

        press(&mut e, KeyCode::Enter);
        for _ in 0..3 {
            press(&mut e, KeyCode::Backspace);
        }
        type_text(&mut e, "7/8");
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.chart().time_signature, TimeSignature::SevenEight);
        assert_eq!(e.state().status_message.as_deref(), Some("Time saved"));
    }

    #[test]
    fn test_measures_keys() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('+'));
        assert_eq!(e.chart().sections[0].measures, 9);
        for _ in 0..20 {
            press(&mut e, KeyCode::Char('-'));
        }
        assert_eq!(e.chart().sections[0].measures, 1);
    }

    #[test]
    fn test_cycle_kind() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('t'));
        assert_eq!(e.chart().sections[0].kind, SectionType::Verse2);
        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        assert_eq!(e.chart().sections[0].kind, SectionType::Intro4);
    }

    #[test]
    fn test_label_only_for_custom() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Down);
        press(&mut e, KeyCode::Down);
        assert_eq!(e.state().section_field, SectionField::Label);

        press(&mut e, KeyCode::Char('e'));
        assert_eq!(e.state().mode, Mode::Normal);

        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        press(&mut e, KeyCode::Char('T'));
        assert_eq!(e.chart().sections[0].kind, SectionType::Custom);
        press(&mut e, KeyCode::Char('e'));
        type_text(&mut e, "Solo");
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.chart().sections[0].display_label(), "Solo");
    }

    #[test]
    fn test_move_and_reorder() {
        let mut e = editor();
        for name in ["A", "B", "C"] {
            press(&mut e, KeyCode::Char('a'));
            press(&mut e, KeyCode::Char('e'));
            type_text(&mut e, name);
            press(&mut e, KeyCode::Enter);
        }

        // Selection is on C; move it to the front
        press(&mut e, KeyCode::Char('['));
        press(&mut e, KeyCode::Char('['));
        press(&mut e, KeyCode::Char('['));
        assert_eq!(labels(&e), ["C", "A", "B"]);
        assert_eq!(e.state().selected_section, 0);

        // Pick up C and drop it on B
        press(&mut e, KeyCode::Char('m'));
        press(&mut e, KeyCode::Right);
        press(&mut e, KeyCode::Right);
        e.handle_key(KeyCode::Char('M'), KeyModifiers::SHIFT);
        assert_eq!(labels(&e), ["A", "B", "C"]);
        assert_eq!(e.state().selected_section, 2);
        assert!(e.state().marked.is_none());
    }

    #[test]
    fn test_duplicate_and_remove() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('d'));
        assert_eq!(e.chart().sections.len(), 2);
        assert_eq!(e.state().selected_section, 1);

        press(&mut e, KeyCode::Char('x'));
        press(&mut e, KeyCode::Char('x'));
        assert!(e.chart().sections.is_empty());
        assert_eq!(e.state().selected_section, 0);

        // Nothing left to remove
        let revision = e.store().revision();
        press(&mut e, KeyCode::Char('x'));
        assert_eq!(e.store().revision(), revision);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('a'));
        press(&mut e, KeyCode::Char('a'));

        press(&mut e, KeyCode::Char('C'));
        assert_eq!(e.state().mode, Mode::Confirm(ConfirmPrompt::ClearSections));
        press(&mut e, KeyCode::Char('n'));
        assert_eq!(e.chart().sections.len(), 2);

        press(&mut e, KeyCode::Char('C'));
        press(&mut e, KeyCode::Char('y'));
        assert!(e.chart().sections.is_empty());
        assert_eq!(e.state().mode, Mode::Normal);
    }

    #[test]
    fn test_reset_chart() {
        let mut e = Editor::new(ChartStore::new(SongChart::default(), NullSink));
        press(&mut e, KeyCode::Char('l'));
        press(&mut e, KeyCode::Char('R'));
        press(&mut e, KeyCode::Char('y'));
        assert!(e.chart().sections.is_empty());
        assert!(e.chart().links.is_empty());
        assert_eq!(e.chart().title, "");
    }

    #[test]
    fn test_links() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('l'));
        assert_eq!(e.state().focus, Focus::Links);

        press(&mut e, KeyCode::Enter);
        type_text(&mut e, "Spotify");
        press(&mut e, KeyCode::Enter);
        press(&mut e, KeyCode::Right);
        press(&mut e, KeyCode::Enter);
        type_text(&mut e, "https://x");
        press(&mut e, KeyCode::Enter);

        let link = &e.chart().links[0];
        assert_eq!(link.label, "Spotify");
        assert_eq!(link.url, "https://x");

        press(&mut e, KeyCode::Char('x'));
        assert!(e.chart().links.is_empty());
    }

    #[test]
    fn test_help_toggle() {
        let mut e = editor();
        press(&mut e, KeyCode::Char('?'));
        assert!(e.state().show_help);
        press(&mut e, KeyCode::Esc);
        assert!(!e.state().show_help);
    }
}
