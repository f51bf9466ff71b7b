// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Click tone synthesis.

use std::f32::consts::TAU;

/// A short sine burst with an exponential decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTone {
    /// Pitch in Hz
    pub frequency: f32,
    /// Time to decay from `peak` to `floor`, in seconds
    pub duration: f32,
    /// Starting amplitude
    pub peak: f32,
    /// Amplitude reached at `duration`
    pub floor: f32,
}

impl Default for ClickTone {
    fn default() -> Self {
        Self {
            frequency: 880.0,
            duration: 0.1,
            peak: 1.0,
            floor: 0.001,
        }
    }
}

impl ClickTone {
    /// Tone with a custom pitch and length
    pub fn new(frequency: f32, duration: f32) -> Self {
        Self {
            frequency,
            duration: duration.max(0.001),
            ..Self::default()
        }
    }

    /// Envelope value `t` seconds after the onset
    pub fn amplitude_at(&self, t: f32) -> f32 {
        if !(0.0..self.duration).contains(&t) {
            return 0.0;
        }
        // peak * (floor / peak) ^ (t / duration)
        self.peak * (self.floor / self.peak).powf(t / self.duration)
    }

    /// Sample value `t` seconds after the onset
    pub fn sample_at(&self, t: f32) -> f32 {
        self.amplitude_at(t) * (t * self.frequency * TAU).sin()
    }

    /// Number of frames the tone lasts
    pub fn frame_count(&self, sample_rate: u32) -> usize {
        (self.duration * sample_rate as f32).round() as usize
    }

    /// Render the whole tone as mono samples
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate.max(1) as f32;
        (0..self.frame_count(sample_rate))
            .map(|i| self.sample_at(i as f32 / rate))
            .collect()
    }
}
