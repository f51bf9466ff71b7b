// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The chart store.
//!
//! `ChartStore` owns the current chart and is the only place it is mutated.
//! Every operation works on a copy of the document and swaps it in whole, so
//! callers never see a half-applied change. When an operation actually
//! changes the chart, the new document is handed to the store's
//! [`ChartSink`] exactly once.
//!
//! Operations that reference an unknown id, hit a list boundary or would
//! write an identical value are no-ops: the chart, the revision and the
//! sink are left untouched.

use tracing::{debug, warn};

use super::ids::IdAllocator;
use super::model::{ChartSection, LinkId, ReferenceLink, SectionId, SectionType, SongChart};
use super::update::{LinkUpdate, MetadataField, SectionUpdate};
use crate::storage::StorageError;

/// Receives every committed chart
pub trait ChartSink {
    /// Persist a snapshot of the chart
    fn persist(&mut self, chart: &SongChart) -> Result<(), StorageError>;
}

/// Sink that drops every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChartSink for NullSink {
    fn persist(&mut self, _chart: &SongChart) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Direction for moving a section one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Owner of the current chart
pub struct ChartStore<S: ChartSink> {
    chart: SongChart,
    ids: IdAllocator,
    sink: S,
    revision: u64,
    last_persist_error: Option<String>,
}

impl<S: ChartSink> ChartStore<S> {
    /// Create a store around an existing chart
    pub fn new(chart: SongChart, sink: S) -> Self {
        let ids = IdAllocator::seeded_from(&chart);
        Self {
            chart,
            ids,
            sink,
            revision: 0,
            last_persist_error: None,
        }
    }

    /// Current chart
    pub fn chart(&self) -> &SongChart {
        &self.chart
    }

    /// Number of applied mutations since the store was created
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sink handle
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Message of the most recent failed persist, cleared by the next success
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Replace one metadata field
    pub fn update_metadata(&mut self, field: MetadataField, value: &str) -> bool {
        self.commit(|chart, _| field.apply(chart, value))
    }

    /// Append a new Verso 1 section and return its id
    pub fn add_section(&mut self) -> SectionId {
        let id = self.ids.section();
        self.commit(|chart, _| {
            chart.sections.push(ChartSection::new(
                id.clone(),
                SectionType::Verse1,
                ChartSection::DEFAULT_MEASURES,
            ));
            true
        });
        id
    }

    /// Apply a typed update to one section
    pub fn update_section(&mut self, id: &SectionId, update: SectionUpdate) -> bool {
        self.commit(|chart, _| {
            chart
                .sections
                .iter_mut()
                .find(|s| &s.id == id)
                .is_some_and(|section| update.apply(section))
        })
    }

    /// Remove the section with `id`
    pub fn remove_section(&mut self, id: &SectionId) -> bool {
        self.commit(|chart, _| match chart.section_index(id) {
            Some(index) => {
                chart.sections.remove(index);
                true
            }
            None => false,
        })
    }

    /// Insert a copy of a section right after it, returning the copy's id
    pub fn duplicate_section(&mut self, id: &SectionId) -> Option<SectionId> {
        let mut copied = None;
        self.commit(|chart, ids| {
            let Some(index) = chart.section_index(id) else {
                return false;
            };
            let mut copy = chart.sections[index].clone();
            copy.id = ids.section();
            copied = Some(copy.id.clone());
            chart.sections.insert(index + 1, copy);
            true
        });
        copied
    }

    /// Swap a section with its neighbor; no wraparound
    pub fn move_section(&mut self, id: &SectionId, direction: Direction) -> bool {
        self.commit(|chart, _| {
            let Some(index) = chart.section_index(id) else {
                return false;
            };
            let target = match direction {
                Direction::Left if index > 0 => index - 1,
                Direction::Right if index + 1 < chart.sections.len() => index + 1,
                _ => return false,
            };
            chart.sections.swap(index, target);
            true
        })
    }

    /// Drag-and-drop: take `dragged` out and reinsert it at `target`'s index
    pub fn reorder_sections(&mut self, dragged: &SectionId, target: &SectionId) -> bool {
        if dragged == target {
            return false;
        }
        self.commit(|chart, _| {
            let (Some(from), Some(to)) = (chart.section_index(dragged), chart.section_index(target))
            else {
                return false;
            };
            let section = chart.sections.remove(from);
            chart.sections.insert(to, section);
            true
        })
    }

    /// Append an empty reference link and return its id
    pub fn add_link(&mut self) -> LinkId {
        let id = self.ids.link();
        self.commit(|chart, _| {
            chart.links.push(ReferenceLink::new(id.clone()));
            true
        });
        id
    }

    /// Apply a typed update to one link
    pub fn update_link(&mut self, id: &LinkId, update: LinkUpdate) -> bool {
        self.commit(|chart, _| {
            chart
                .links
                .iter_mut()
                .find(|l| &l.id == id)
                .is_some_and(|link| update.apply(link))
        })
    }

    /// Remove the link with `id`
    pub fn remove_link(&mut self, id: &LinkId) -> bool {
        self.commit(|chart, _| match chart.link_index(id) {
            Some(index) => {
                chart.links.remove(index);
                true
            }
            None => false,
        })
    }

    /// Empty the section list once `confirm` agrees. Metadata and links stay.
    ///
    /// Returns whether the user confirmed.
    pub fn clear_sections(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.commit(|chart, _| {
            let changed = !chart.sections.is_empty();
            chart.sections.clear();
            changed
        });
        true
    }

    /// Empty sections, links and metadata once `confirm` agrees. The chart id stays.
    ///
    /// Returns whether the user confirmed.
    pub fn reset_chart(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.commit(|chart, _| {
            let blank = SongChart::empty(chart.id.clone());
            let changed = *chart != blank;
            *chart = blank;
            changed
        });
        true
    }

    /// Run `op` on a copy of the chart and swap it in if it reports a change
    fn commit<F>(&mut self, op: F) -> bool
    where
        F: FnOnce(&mut SongChart, &mut IdAllocator) -> bool,
    {
        let mut next = self.chart.clone();
        if !op(&mut next, &mut self.ids) {
            return false;
        }
        self.chart = next;
        self.revision += 1;
        debug!(revision = self.revision, sections = self.chart.sections.len(), "chart updated");

        match self.sink.persist(&self.chart) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                warn!("Failed to persist chart: {}", e);
                self.last_persist_error = Some(e.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::model::ChartId;

    /// Sink that keeps every snapshot it receives
    #[derive(Default)]
    struct CountingSink {
        snapshots: Vec<SongChart>,
        fail: bool,
    }

    impl ChartSink for CountingSink {
        fn persist(&mut self, chart: &SongChart) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.snapshots.push(chart.clone());
            Ok(())
        }
    }

    fn store_with(measures: &[u32]) -> (ChartStore<CountingSink>, Vec<SectionId>) {
        let mut store = ChartStore::new(SongChart::empty(ChartId::from("c")), CountingSink::default());
        let ids: Vec<SectionId> = measures
            .iter()
            .map(|&m| {
                let id = store.add_section();
                store.update_section(&id, SectionUpdate::Measures(m));
                id
            })
            .collect();
        (store, ids)
    }

    fn order(store: &ChartStore<CountingSink>) -> Vec<SectionId> {
        store.chart().section_ids()
    }

    #[test]
    fn test_add_section_defaults() {
        let mut store = ChartStore::new(SongChart::empty(ChartId::from("c")), NullSink);
        let id = store.add_section();

        let section = store.chart().section(&id).unwrap();
        assert_eq!(section.kind, SectionType::Verse1);
        assert_eq!(section.measures, 8);
        assert!(section.notation.is_empty());
        assert!(section.cues.is_empty());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_add_section_fresh_ids() {
        let mut store = ChartStore::new(SongChart::default(), NullSink);
        let existing = store.chart().sections[0].id.clone();
        let a = store.add_section();
        store.remove_section(&a);
        let b = store.add_section();
        assert_ne!(a, b);
        assert_ne!(a, existing);
        assert_ne!(b, existing);
    }

    #[test]
    fn test_update_metadata() {
        let mut store = ChartStore::new(SongChart::default(), CountingSink::default());
        assert!(store.update_metadata(MetadataField::Tempo, "96"));
        assert_eq!(store.chart().tempo, 96);
        assert!(store.update_metadata(MetadataField::Tempo, "noventa"));
        assert_eq!(store.chart().tempo, 0);
        assert!(store.update_metadata(MetadataField::Genre, "Samba"));
        assert_eq!(store.chart().genre, "Samba");
        assert_eq!(store.sink().snapshots.len(), 3);
    }

    #[test]
    fn test_update_unknown_section_is_noop() {
        let (mut store, _) = store_with(&[4]);
        let before = store.chart().clone();
        let writes = store.sink().snapshots.len();

        assert!(!store.update_section(&SectionId::from("nope"), SectionUpdate::Cues("x".into())));
        assert_eq!(store.chart(), &before);
        assert_eq!(store.sink().snapshots.len(), writes);
    }

    #[test]
    fn test_update_leaves_other_sections() {
        let (mut store, ids) = store_with(&[4, 8]);
        store.update_section(&ids[0], SectionUpdate::Notation("C | G".into()));
        assert_eq!(store.chart().sections[0].notation, "C | G");
        assert_eq!(store.chart().sections[1].notation, "");
    }

    #[test]
    fn test_remove_section() {
        let (mut store, ids) = store_with(&[4, 4, 4]);
        // identical content, distinct ids
        assert!(store.remove_section(&ids[1]));
        assert_eq!(order(&store), vec![ids[0].clone(), ids[2].clone()]);

        let before = store.chart().clone();
        assert!(!store.remove_section(&SectionId::from("nonexistent")));
        assert_eq!(store.chart(), &before);
    }

    #[test]
    fn test_duplicate_section() {
        let (mut store, ids) = store_with(&[4, 8]);
        store.update_section(&ids[0], SectionUpdate::Cues("Só bateria".into()));

        let copy = store.duplicate_section(&ids[0]).unwrap();
        let chart = store.chart();
        assert_eq!(chart.sections.len(), 3);
        assert_eq!(chart.sections[1].id, copy);
        assert_ne!(copy, ids[0]);
        assert_eq!(chart.sections[1].measures, 4);
        assert_eq!(chart.sections[1].cues, "Só bateria");
        assert_eq!(chart.sections[2].id, ids[1]);

        assert!(store.duplicate_section(&SectionId::from("nope")).is_none());
        assert_eq!(store.chart().sections.len(), 3);
    }

    #[test]
    fn test_move_section() {
        let (mut store, ids) = store_with(&[4, 8, 2]);

        assert!(!store.move_section(&ids[0], Direction::Left));
        assert!(!store.move_section(&ids[2], Direction::Right));
        assert!(!store.move_section(&SectionId::from("nope"), Direction::Left));
        assert_eq!(order(&store), ids);

        assert!(store.move_section(&ids[1], Direction::Left));
        assert_eq!(order(&store), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);

        assert!(store.move_section(&ids[1], Direction::Right));
        assert_eq!(order(&store), ids);
    }

    #[test]
    fn test_reorder_sections() {
        let (mut store, ids) = store_with(&[1, 2, 3, 4]);

        assert!(store.reorder_sections(&ids[0], &ids[2]));
        assert_eq!(
            order(&store),
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone(), ids[3].clone()]
        );

        assert!(store.reorder_sections(&ids[3], &ids[1]));
        assert_eq!(
            order(&store),
            vec![ids[3].clone(), ids[1].clone(), ids[2].clone(), ids[0].clone()]
        );
    }

    #[test]
    fn test_reorder_adjacent_round_trip() {
        let (mut store, ids) = store_with(&[1, 2, 3]);
        store.reorder_sections(&ids[1], &ids[2]);
        store.reorder_sections(&ids[2], &ids[1]);
        assert_eq!(order(&store), ids);
    }

    #[test]
    fn test_reorder_noops() {
        let (mut store, ids) = store_with(&[1, 2]);
        let revision = store.revision();
        assert!(!store.reorder_sections(&ids[0], &ids[0]));
        assert!(!store.reorder_sections(&ids[0], &SectionId::from("x")));
        assert!(!store.reorder_sections(&SectionId::from("x"), &ids[0]));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_links() {
        let mut store = ChartStore::new(SongChart::default(), CountingSink::default());
        let spotify = store.add_link();
        let youtube = store.add_link();
        assert_ne!(spotify, youtube);

        assert!(store.update_link(&spotify, LinkUpdate::Label("Spotify".into())));
        assert!(store.update_link(&youtube, LinkUpdate::Url("https://youtu.be/x".into())));
        assert!(!store.update_link(&LinkId::from("zz"), LinkUpdate::Label("x".into())));

        assert!(store.remove_link(&spotify));
        assert!(!store.remove_link(&spotify));
        assert_eq!(store.chart().links.len(), 1);
        assert_eq!(store.chart().links[0].url, "https://youtu.be/x");
    }

    #[test]
    fn test_clear_sections_requires_confirmation() {
        let (mut store, _) = store_with(&[4, 8]);
        store.update_metadata(MetadataField::Title, "Tarde em Itapuã");
        store.add_link();

        assert!(!store.clear_sections(|| false));
        assert_eq!(store.chart().sections.len(), 2);

        assert!(store.clear_sections(|| true));
        assert!(store.chart().sections.is_empty());
        assert_eq!(store.chart().title, "Tarde em Itapuã");
        assert_eq!(store.chart().links.len(), 1);
    }

    #[test]
    fn test_reset_chart() {
        let mut store = ChartStore::new(SongChart::default(), CountingSink::default());
        store.add_link();
        let id = store.chart().id.clone();

        assert!(!store.reset_chart(|| false));
        assert_eq!(store.chart().tempo, 120);

        assert!(store.reset_chart(|| true));
        let chart = store.chart();
        assert_eq!(chart.id, id);
        assert!(chart.sections.is_empty());
        assert!(chart.links.is_empty());
        assert!(chart.title.is_empty());
        assert_eq!(chart.tempo, 0);
    }

    #[test]
    fn test_persist_once_per_mutation() {
        let (mut store, ids) = store_with(&[4]);
        let writes = store.sink().snapshots.len();
        assert_eq!(writes as u64, store.revision());

        store.move_section(&ids[0], Direction::Left);
        store.clear_sections(|| false);
        assert_eq!(store.sink().snapshots.len(), writes);

        store.update_section(&ids[0], SectionUpdate::IncrementMeasures);
        assert_eq!(store.sink().snapshots.len(), writes + 1);
        assert_eq!(store.sink().snapshots.last().unwrap(), store.chart());
    }

    #[test]
    fn test_persist_failure_keeps_mutation() {
        let mut store = ChartStore::new(SongChart::default(), CountingSink::default());
        store.sink.fail = true;

        let id = store.add_section();
        assert!(store.chart().section(&id).is_some());
        assert!(store.last_persist_error().unwrap().contains("quota"));

        store.sink.fail = false;
        store.update_section(&id, SectionUpdate::IncrementMeasures);
        assert!(store.last_persist_error().is_none());
    }
}
