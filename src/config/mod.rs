// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application configuration.
//!
//! Settings are read from a TOML file. Every field has a default, so a
//! missing file or a partial file is fine.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metronome::{ClickTone, OutputConfig, SchedulerConfig};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bandchart.toml";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metronome: MetronomeConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file: {:?}", path))
            }
        };
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Where chart snapshots are kept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory of the file store
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.bandchart")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Metronome sound and timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetronomeConfig {
    /// Click pitch in Hz
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Click length in milliseconds
    #[serde(default = "default_click_ms")]
    pub click_ms: u64,
    /// Coarse timer period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Lookahead window in milliseconds
    #[serde(default = "default_schedule_ahead_ms")]
    pub schedule_ahead_ms: u64,
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Output buffer size in frames
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

fn default_frequency() -> f32 {
    880.0
}
fn default_click_ms() -> u64 {
    100
}
fn default_tick_ms() -> u64 {
    25
}
fn default_schedule_ahead_ms() -> u64 {
    100
}
fn default_sample_rate() -> u32 {
    44100
}
fn default_buffer_size() -> u32 {
    512
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            click_ms: default_click_ms(),
            tick_ms: default_tick_ms(),
            schedule_ahead_ms: default_schedule_ahead_ms(),
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl MetronomeConfig {
    /// Scheduler settings for these values
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            schedule_ahead: Duration::from_millis(self.schedule_ahead_ms),
            tone: ClickTone::new(self.frequency, self.click_ms as f32 / 1000.0),
        }
    }

    /// Output stream settings for these values
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size,
            ..OutputConfig::default()
        }
    }
}

/// Print export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Default output path of the print sheet
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

fn default_export_path() -> PathBuf {
    PathBuf::from("chart.txt")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

/// Terminal editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Redraw rate in frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_frame_rate() -> u32 {
    30
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}
