// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Typed update requests for chart fields.
//!
//! Each editable field group has its own request variant, so an update can
//! only ever touch one field and a value is parsed once, here, rather than by
//! every caller.

use super::model::{ChartSection, ReferenceLink, SectionType, SongChart, TimeSignature};

/// Editable metadata fields of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Title,
    Artist,
    Tempo,
    TimeSignature,
    Feel,
    Genre,
}

impl MetadataField {
    /// Fields in the order the header shows them
    pub const ALL: [MetadataField; 6] = [
        MetadataField::Title,
        MetadataField::Artist,
        MetadataField::Tempo,
        MetadataField::TimeSignature,
        MetadataField::Feel,
        MetadataField::Genre,
    ];

    /// Field caption
    pub fn label(&self) -> &'static str {
        match self {
            MetadataField::Title => "Title",
            MetadataField::Artist => "Artist",
            MetadataField::Tempo => "Tempo",
            MetadataField::TimeSignature => "Time",
            MetadataField::Feel => "Feel",
            MetadataField::Genre => "Genre",
        }
    }

    /// Current value of the field as text
    pub fn value(&self, chart: &SongChart) -> String {
        match self {
            MetadataField::Title => chart.title.clone(),
            MetadataField::Artist => chart.artist.clone(),
            MetadataField::Tempo => chart.tempo.to_string(),
            MetadataField::TimeSignature => chart.time_signature.to_string(),
            MetadataField::Feel => chart.feel.clone(),
            MetadataField::Genre => chart.genre.clone(),
        }
    }

    /// Write `value` into the field, returning whether the chart changed.
    ///
    /// Tempo keeps the leading integer of the text, 0 when there is none. A time
    /// signature outside the offered set leaves the field untouched.
    pub fn apply(&self, chart: &mut SongChart, value: &str) -> bool {
        match self {
            MetadataField::Title => replace(&mut chart.title, value),
            MetadataField::Artist => replace(&mut chart.artist, value),
            MetadataField::Feel => replace(&mut chart.feel, value),
            MetadataField::Genre => replace(&mut chart.genre, value),
            MetadataField::Tempo => {
                let tempo = parse_tempo(value);
                let changed = chart.tempo != tempo;
                chart.tempo = tempo;
                changed
            }
            MetadataField::TimeSignature => match TimeSignature::parse(value) {
                Some(sig) if sig != chart.time_signature => {
                    chart.time_signature = sig;
                    true
                }
                _ => false,
            },
        }
    }
}

/// Parse the leading integer of tempo text, 0 when there is none.
///
/// Trailing text is ignored, so "12.5" reads as 12 and "96 bpm" as 96.
pub fn parse_tempo(value: &str) -> u32 {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse::<u32>().unwrap_or(0)
}

fn replace(field: &mut String, value: &str) -> bool {
    if field == value {
        return false;
    }
    *field = value.to_string();
    true
}

/// A single change to one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    /// Change the section role
    Kind(SectionType),
    /// Set the label of a custom section (ignored for other kinds)
    CustomLabel(String),
    /// Set the measure count (clamped to at least 1)
    Measures(u32),
    /// Measure count typed as text (invalid text becomes 1)
    MeasuresText(String),
    /// Add one measure
    IncrementMeasures,
    /// Remove one measure, never going below 1
    DecrementMeasures,
    /// Replace chord notation
    Notation(String),
    /// Replace performance cues
    Cues(String),
}

impl SectionUpdate {
    /// Apply to a section, returning whether it changed
    pub fn apply(&self, section: &mut ChartSection) -> bool {
        match self {
            SectionUpdate::Kind(kind) => {
                let changed = section.kind != *kind;
                section.kind = *kind;
                changed
            }
            SectionUpdate::CustomLabel(label) => {
                if section.kind != SectionType::Custom {
                    return false;
                }
                if section.custom_label.as_deref() == Some(label.as_str()) {
                    return false;
                }
                section.custom_label = Some(label.clone());
                true
            }
            SectionUpdate::Measures(measures) => set_measures(section, *measures),
            SectionUpdate::MeasuresText(text) => {
                let measures = text.trim().parse::<u32>().unwrap_or(1);
                set_measures(section, measures)
            }
            SectionUpdate::IncrementMeasures => {
                set_measures(section, section.measures.saturating_add(1))
            }
            SectionUpdate::DecrementMeasures => {
                set_measures(section, section.measures.saturating_sub(1))
            }
            SectionUpdate::Notation(text) => replace(&mut section.notation, text),
            SectionUpdate::Cues(text) => replace(&mut section.cues, text),
        }
    }
}

fn set_measures(section: &mut ChartSection, measures: u32) -> bool {
    let measures = measures.max(1);
    let changed = section.measures != measures;
    section.measures = measures;
    changed
}

/// A single change to one reference link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkUpdate {
    Label(String),
    Url(String),
}

impl LinkUpdate {
    /// Apply to a link, returning whether it changed
    pub fn apply(&self, link: &mut ReferenceLink) -> bool {
        match self {
            LinkUpdate::Label(label) => replace(&mut link.label, label),
            LinkUpdate::Url(url) => replace(&mut link.url, url),
        }
    }
}
