// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Click output via cpal.
//!
//! The output stream owns the audio clock: every callback advances a
//! [`SampleClock`] by the frames it rendered, and pulses queued by the
//! scheduler are started on the exact frame their time maps to.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;
use tracing::{error, info};

use super::click::ClickTone;
use super::clock::SampleClock;
use super::scheduler::{Pulse, PulseSink};

/// Audio error types
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// No audio device available
    #[error("No audio output device available")]
    NoDevice,
    /// Failed to query or configure the device
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to build or start the stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
}

/// Output stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 2,
        }
    }
}

impl OutputConfig {
    /// Buffer latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        (self.buffer_size as f64 / self.sample_rate as f64) * 1000.0
    }
}

/// Pulses handed over from the scheduler thread to the audio callback
#[derive(Debug, Clone, Default)]
pub struct PulseQueue {
    pending: Arc<Mutex<Vec<Pulse>>>,
}

impl PulseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending pulse without blocking; empty if the lock is busy
    fn try_drain(&self) -> Vec<Pulse> {
        match self.pending.try_lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => Vec::new(),
        }
    }

    /// Number of pulses not yet picked up by the callback
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl PulseSink for PulseQueue {
    fn schedule(&mut self, pulse: Pulse) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(pulse);
        }
    }
}

/// A click currently sounding
#[derive(Debug, Clone, Copy)]
struct Voice {
    start_frame: u64,
    tone: ClickTone,
    length: u64,
}

impl Voice {
    fn new(pulse: &Pulse, clock: &SampleClock) -> Self {
        Self {
            start_frame: clock.frame_at(pulse.at),
            tone: pulse.tone,
            length: pulse.tone.frame_count(clock.sample_rate()) as u64,
        }
    }

    fn finished_by(&self, frame: u64) -> bool {
        frame >= self.start_frame + self.length
    }
}

/// Mix every voice into an interleaved buffer starting at `base_frame`
fn mix_voices(voices: &[Voice], base_frame: u64, sample_rate: u32, data: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    let rate = sample_rate.max(1) as f32;

    for (i, frame) in data.chunks_mut(channels).enumerate() {
        let position = base_frame + i as u64;
        let value: f32 = voices
            .iter()
            .filter(|v| position >= v.start_frame)
            .map(|v| v.tone.sample_at((position - v.start_frame) as f32 / rate))
            .sum();
        for sample in frame.iter_mut() {
            *sample = value.clamp(-1.0, 1.0);
        }
    }
}

/// Audio output playing queued clicks
pub struct ClickOutput {
    _stream: Stream,
    _device: Device,
    config: OutputConfig,
    clock: SampleClock,
    queue: PulseQueue,
}

impl ClickOutput {
    /// Open the default output device
    pub fn open(config: OutputConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let _supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let clock = SampleClock::new(config.sample_rate);
        let queue = PulseQueue::new();

        let channels = config.channels as usize;
        let callback_clock = clock.clone();
        let callback_queue = queue.clone();
        let mut voices: Vec<Voice> = Vec::with_capacity(8);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let base = callback_clock.frames();
                    voices.extend(
                        callback_queue
                            .try_drain()
                            .iter()
                            .map(|pulse| Voice::new(pulse, &callback_clock)),
                    );

                    mix_voices(&voices, base, callback_clock.sample_rate(), data, channels);

                    let frames = (data.len() / channels.max(1)) as u64;
                    callback_clock.advance_frames(frames);
                    voices.retain(|v| !v.finished_by(base + frames));
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            sample_rate = config.sample_rate,
            latency_ms = config.latency_ms(),
            "Click output opened"
        );

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
            clock,
            queue,
        })
    }

    /// Clock advanced by this output
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    /// Sink feeding this output
    pub fn queue(&self) -> PulseQueue {
        self.queue.clone()
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }
}
