// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song chart document and its store.
//!
//! This module provides:
//! - Model: the chart, its sections and reference links
//! - Typed updates for metadata, sections and links
//! - The store that owns the chart and persists every change

pub mod ids;
pub mod model;
pub mod store;
pub mod update;

pub use ids::IdAllocator;
pub use model::{
    ChartId, ChartSection, LinkId, ReferenceLink, SectionId, SectionType, SongChart,
    TimeSignature,
};
pub use store::{ChartSink, ChartStore, Direction, NullSink};
pub use update::{parse_tempo, LinkUpdate, MetadataField, SectionUpdate};
