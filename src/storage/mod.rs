// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Local key-value persistence for charts.
//!
//! This module provides:
//! - `KeyValueStore`: the byte-slot abstraction the chart is mirrored into
//! - `FileStore`: one file per key in a directory
//! - `MemoryStore`: in-process store for tests and ephemeral sessions
//! - Snapshot encoding and the load-with-fallback policy

pub mod file;
pub mod memory;
pub mod snapshot;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{
    decode_chart, encode_chart, load_chart, LoadOutcome, StoredChart, CHART_KEY, CORRUPT_KEY,
};

use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a slot failed
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// Chart could not be serialized
    #[error("Failed to encode chart: {0}")]
    Encode(#[source] serde_yaml::Error),
    /// Stored bytes are not a chart
    #[error("Failed to decode chart: {0}")]
    Decode(#[source] serde_yaml::Error),
    /// Store refused the operation (quota, read-only, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A store of named byte slots
pub trait KeyValueStore {
    /// Read a slot, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite a slot
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a slot; deleting a missing slot is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
