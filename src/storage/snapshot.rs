// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chart snapshots in a key-value store.
//!
//! The whole chart is written as YAML under [`CHART_KEY`] after every change.
//! On startup the snapshot is read back; when it is missing the built-in
//! default chart is used, and when it cannot be decoded the default chart is
//! used as well, after the unreadable bytes are copied to [`CORRUPT_KEY`].

use tracing::{info, warn};

use super::{KeyValueStore, StorageError};
use crate::chart::{ChartSink, ChartStore, SongChart};

/// Slot holding the current chart
pub const CHART_KEY: &str = "bandchart_last";

/// Slot receiving a snapshot that failed to decode
pub const CORRUPT_KEY: &str = "bandchart_last.corrupt";

/// How the startup chart was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Snapshot decoded
    Restored,
    /// No snapshot yet, default chart used
    Missing,
    /// Snapshot present but undecodable, default chart used
    Corrupt(String),
    /// Store could not be read, default chart used
    Unreadable(String),
}

impl LoadOutcome {
    /// Whether the default chart stands in for stored data
    pub fn is_fallback(&self) -> bool {
        !matches!(self, LoadOutcome::Restored)
    }
}

/// Serialize a chart
pub fn encode_chart(chart: &SongChart) -> Result<Vec<u8>, StorageError> {
    serde_yaml::to_string(chart)
        .map(String::into_bytes)
        .map_err(StorageError::Encode)
}

/// Deserialize a chart
pub fn decode_chart(bytes: &[u8]) -> Result<SongChart, StorageError> {
    serde_yaml::from_slice(bytes).map_err(StorageError::Decode)
}

/// Read the startup chart, falling back to the default chart
pub fn load_chart<K: KeyValueStore>(store: &mut K) -> (SongChart, LoadOutcome) {
    let bytes = match store.get(CHART_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            info!("No saved chart, starting from default");
            return (SongChart::default(), LoadOutcome::Missing);
        }
        Err(e) => {
            warn!("Failed to read saved chart: {}", e);
            return (SongChart::default(), LoadOutcome::Unreadable(e.to_string()));
        }
    };

    match decode_chart(&bytes) {
        Ok(chart) => {
            info!(title = %chart.title, sections = chart.sections.len(), "Restored saved chart");
            (chart, LoadOutcome::Restored)
        }
        Err(e) => {
            warn!("Saved chart is unreadable, starting from default: {}", e);
            if let Err(backup) = store.set(CORRUPT_KEY, &bytes) {
                warn!("Failed to keep unreadable chart: {}", backup);
            }
            (SongChart::default(), LoadOutcome::Corrupt(e.to_string()))
        }
    }
}

/// Sink writing every committed chart to [`CHART_KEY`]
#[derive(Debug, Clone)]
pub struct StoredChart<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> StoredChart<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &K {
        &self.store
    }
}

impl<K: KeyValueStore> ChartSink for StoredChart<K> {
    fn persist(&mut self, chart: &SongChart) -> Result<(), StorageError> {
        let bytes = encode_chart(chart)?;
        self.store.set(CHART_KEY, &bytes)
    }
}

impl<K: KeyValueStore> ChartStore<StoredChart<K>> {
    /// Open the chart saved in `store`, or the default chart
    pub fn open(mut store: K) -> (Self, LoadOutcome) {
        let (chart, outcome) = load_chart(&mut store);
        (ChartStore::new(chart, StoredChart::new(store)), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{MetadataField, SectionUpdate, TimeSignature};
    use crate::storage::MemoryStore;

    #[test]
    fn test_open_empty_store() {
        let (store, outcome) = ChartStore::open(MemoryStore::new());
        assert_eq!(outcome, LoadOutcome::Missing);
        assert!(outcome.is_fallback());
        assert_eq!(store.chart().title, "Nome da Música");
    }

    #[test]
    fn test_mutations_are_persisted() {
        let memory = MemoryStore::new();
        let (mut store, _) = ChartStore::open(memory.clone());

        store.update_metadata(MetadataField::Title, "Aquarela");
        let id = store.add_section();
        store.update_section(&id, SectionUpdate::Notation("D | A | Bm".into()));
        assert_eq!(memory.write_count(), 3);

        let (reopened, outcome) = ChartStore::open(memory.clone());
        assert_eq!(outcome, LoadOutcome::Restored);
        assert_eq!(reopened.chart(), store.chart());
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let memory = MemoryStore::new();
        let (mut store, _) = ChartStore::open(memory.clone());
        let first = store.add_section();

        let (mut reopened, _) = ChartStore::open(memory);
        let second = reopened.add_section();
        assert_ne!(first, second);
        assert_eq!(reopened.chart().sections.len(), 3);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back() {
        let mut memory = MemoryStore::new();
        memory.set(CHART_KEY, b"sections: [unterminated").unwrap();

        let (store, outcome) = ChartStore::open(memory.clone());
        assert!(matches!(outcome, LoadOutcome::Corrupt(_)));
        assert_eq!(store.chart().tempo, 120);
        assert_eq!(memory.get_text(CORRUPT_KEY), Some("sections: [unterminated".to_string()));
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let mut memory = MemoryStore::new();
        memory.set(CHART_KEY, b"- just\n- a list\n").unwrap();

        let (_, outcome) = ChartStore::open(memory);
        assert!(matches!(outcome, LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_decode_encoded_chart() {
        let chart = SongChart::default();
        let bytes = encode_chart(&chart).unwrap();
        assert_eq!(decode_chart(&bytes).unwrap(), chart);
    }

    #[test]
    fn test_odd_meter_survives_reopen() {
        let mut memory = MemoryStore::new();
        memory
            .set(
                CHART_KEY,
                br#"{"id":"k1","title":"Take Five","tempo":172,"timeSignature":"5/4","sections":[]}"#,
            )
            .unwrap();

        let (mut store, outcome) = ChartStore::open(memory.clone());
        assert_eq!(outcome, LoadOutcome::Restored);
        assert_eq!(store.chart().time_signature, TimeSignature::FiveFour);

        assert!(store.update_metadata(MetadataField::TimeSignature, "7/8"));
        let (reopened, _) = ChartStore::open(memory);
        assert_eq!(reopened.chart().time_signature, TimeSignature::SevenEight);
        assert_eq!(MetadataField::TimeSignature.value(reopened.chart()), "7/8");
    }
}
