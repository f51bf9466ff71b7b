// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! bandchart: song chart editor with a lookahead metronome.
//!
//! - `chart`: the chart document and the store that owns it
//! - `storage`: key-value persistence of chart snapshots
//! - `metronome`: beat scheduling, click synthesis and audio output
//! - `export`: plain-text print sheet
//! - `config`: TOML application settings
//! - `ui`: terminal editor

pub mod chart;
pub mod config;
pub mod export;
pub mod metronome;
pub mod storage;
pub mod ui;
