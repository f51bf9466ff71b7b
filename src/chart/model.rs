// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song chart document model.
//!
//! A chart is the metadata of a song (title, artist, tempo, ...) plus the
//! ordered list of sections a band plays through and an optional list of
//! reference links. Field names serialize in camelCase so snapshots written
//! by older versions of the editor still load.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Identifier of a chart document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(String);

impl ChartId {
    /// Create a random chart id (16 hex digits)
    pub fn random() -> Self {
        let value: u64 = rand::thread_rng().gen();
        Self(format!("{:016x}", value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChartId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a section, unique within its chart
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub(crate) String);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a reference link, unique within its chart
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub(crate) String);

impl LinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Musical role of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionType {
    #[serde(rename = "Intro")]
    Intro,
    #[serde(rename = "Intro 2")]
    Intro2,
    #[serde(rename = "Intro 3")]
    Intro3,
    #[serde(rename = "Intro 4")]
    Intro4,
    #[serde(rename = "Verso 1")]
    Verse1,
    #[serde(rename = "Verso 2")]
    Verse2,
    #[serde(rename = "Verso 3")]
    Verse3,
    #[serde(rename = "Verso 4")]
    Verse4,
    #[serde(rename = "Pré-Refrão")]
    PreChorus,
    #[serde(rename = "Refrão")]
    Chorus,
    #[serde(rename = "Pós-Refrão")]
    PostChorus,
    #[serde(rename = "Ponte")]
    Bridge,
    #[serde(rename = "Interlúdio")]
    Interlude,
    #[serde(rename = "Refrão Final")]
    FinalChorus,
    #[serde(rename = "Outro / Final")]
    Outro,
    #[serde(rename = "Customizado")]
    Custom,
}

impl SectionType {
    /// All section types in the order they are offered
    pub const ALL: [SectionType; 16] = [
        SectionType::Intro,
        SectionType::Intro2,
        SectionType::Intro3,
        SectionType::Intro4,
        SectionType::Verse1,
        SectionType::Verse2,
        SectionType::Verse3,
        SectionType::Verse4,
        SectionType::PreChorus,
        SectionType::Chorus,
        SectionType::PostChorus,
        SectionType::Bridge,
        SectionType::Interlude,
        SectionType::FinalChorus,
        SectionType::Outro,
        SectionType::Custom,
    ];

    /// Label shown on the chart
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Intro => "Intro",
            SectionType::Intro2 => "Intro 2",
            SectionType::Intro3 => "Intro 3",
            SectionType::Intro4 => "Intro 4",
            SectionType::Verse1 => "Verso 1",
            SectionType::Verse2 => "Verso 2",
            SectionType::Verse3 => "Verso 3",
            SectionType::Verse4 => "Verso 4",
            SectionType::PreChorus => "Pré-Refrão",
            SectionType::Chorus => "Refrão",
            SectionType::PostChorus => "Pós-Refrão",
            SectionType::Bridge => "Ponte",
            SectionType::Interlude => "Interlúdio",
            SectionType::FinalChorus => "Refrão Final",
            SectionType::Outro => "Outro / Final",
            SectionType::Custom => "Customizado",
        }
    }

    /// Next type in offer order, wrapping around
    pub fn next(&self) -> SectionType {
        let index = self.position();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Previous type in offer order, wrapping around
    pub fn previous(&self) -> SectionType {
        let index = self.position();
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time signatures offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeSignature {
    #[default]
    FourFour,
    ThreeFour,
    TwoFour,
    SixEight,
    TwelveEight,
    FiveFour,
    SevenEight,
}

impl TimeSignature {
    /// All offered signatures
    pub const ALL: [TimeSignature; 7] = [
        TimeSignature::FourFour,
        TimeSignature::ThreeFour,
        TimeSignature::TwoFour,
        TimeSignature::SixEight,
        TimeSignature::TwelveEight,
        TimeSignature::FiveFour,
        TimeSignature::SevenEight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSignature::FourFour => "4/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::TwoFour => "2/4",
            TimeSignature::SixEight => "6/8",
            TimeSignature::TwelveEight => "12/8",
            TimeSignature::FiveFour => "5/4",
            TimeSignature::SevenEight => "7/8",
        }
    }

    /// Parse one of the offered signatures
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.iter().copied().find(|sig| sig.as_str() == value)
    }

    /// Next offered signature, wrapping around
    pub fn next(&self) -> TimeSignature {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Previous offered signature, wrapping around
    pub fn previous(&self) -> TimeSignature {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<String> for TimeSignature {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_else(|| {
            warn!("Unknown time signature {:?}, using 4/4", value);
            TimeSignature::default()
        })
    }
}

impl From<TimeSignature> for String {
    fn from(value: TimeSignature) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One section of the song structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSection {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub kind: SectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(default = "default_measures", deserialize_with = "de_measures")]
    pub measures: u32,
    #[serde(default)]
    pub notation: String,
    #[serde(default)]
    pub cues: String,
}

fn default_measures() -> u32 {
    ChartSection::DEFAULT_MEASURES
}

/// Snapshots may carry a zero measure count; the invariant says at least one
fn de_measures<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = u32::deserialize(deserializer)?;
    Ok(value.max(1))
}

impl ChartSection {
    /// Measure count of a freshly added section
    pub const DEFAULT_MEASURES: u32 = 8;

    /// Create a section with empty notation and cues
    pub fn new(id: SectionId, kind: SectionType, measures: u32) -> Self {
        Self {
            id,
            kind,
            custom_label: None,
            measures: measures.max(1),
            notation: String::new(),
            cues: String::new(),
        }
    }

    /// Builder: set notation
    pub fn with_notation(mut self, notation: impl Into<String>) -> Self {
        self.notation = notation.into();
        self
    }

    /// Builder: set cues
    pub fn with_cues(mut self, cues: impl Into<String>) -> Self {
        self.cues = cues.into();
        self
    }

    /// Builder: set custom label
    pub fn with_custom_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }

    /// Label to print for this section
    pub fn display_label(&self) -> &str {
        match (&self.kind, self.custom_label.as_deref()) {
            (SectionType::Custom, Some(label)) if !label.trim().is_empty() => label,
            (kind, _) => kind.label(),
        }
    }
}

/// An external reference (streaming track, video, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLink {
    pub id: LinkId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
}

impl ReferenceLink {
    /// Create an empty link
    pub fn new(id: LinkId) -> Self {
        Self {
            id,
            label: String::new(),
            url: String::new(),
        }
    }
}

/// The complete song document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongChart {
    pub id: ChartId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub tempo: u32,
    #[serde(default)]
    pub time_signature: TimeSignature,
    #[serde(default)]
    pub feel: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub sections: Vec<ChartSection>,
    #[serde(default)]
    pub links: Vec<ReferenceLink>,
}

impl SongChart {
    /// Create an empty chart with the given id
    pub fn empty(id: ChartId) -> Self {
        Self {
            id,
            title: String::new(),
            artist: String::new(),
            tempo: 0,
            time_signature: TimeSignature::default(),
            feel: String::new(),
            genre: String::new(),
            sections: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Builder: add section
    pub fn with_section(mut self, section: ChartSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Index of a section by id
    pub fn section_index(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|s| &s.id == id)
    }

    /// Section by id
    pub fn section(&self, id: &SectionId) -> Option<&ChartSection> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Index of a link by id
    pub fn link_index(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| &l.id == id)
    }

    /// Total measures across all sections
    pub fn total_measures(&self) -> u32 {
        self.sections.iter().map(|s| s.measures).sum()
    }

    /// Section ids in performance order
    pub fn section_ids(&self) -> Vec<SectionId> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }
}

impl Default for SongChart {
    /// The chart shown on first start
    fn default() -> Self {
        Self {
            id: ChartId::random(),
            title: "Nome da Música".to_string(),
            artist: "Nome do Artista".to_string(),
            tempo: 120,
            time_signature: TimeSignature::FourFour,
            feel: "GROOVE".to_string(),
            genre: "Gênero".to_string(),
            sections: vec![ChartSection::new(SectionId::from("s1"), SectionType::Intro, 4)
                .with_notation("Am | G | F | E7")
                .with_cues("Só bateria")],
            links: Vec::new(),
        }
    }
}
