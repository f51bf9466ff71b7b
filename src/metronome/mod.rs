// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Metronome.
//!
//! This module provides:
//! - Lookahead beat scheduling on an audio clock
//! - Click tone synthesis
//! - A background tick loop
//! - Audio output via cpal

pub mod click;
pub mod clock;
pub mod output;
pub mod runner;
pub mod scheduler;

pub use click::ClickTone;
pub use clock::{AudioClock, ManualClock, SampleClock};
pub use output::{AudioError, ClickOutput, OutputConfig, PulseQueue};
pub use runner::MetronomeRunner;
pub use scheduler::{
    BeatScheduler, Pulse, PulseSink, RecordingSink, SchedulerConfig, SchedulerState,
    SCHEDULE_AHEAD, TICK_INTERVAL,
};
