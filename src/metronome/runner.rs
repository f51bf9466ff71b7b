// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Background tick loop for the beat scheduler.
//!
//! A worker thread waits on a control channel with a timeout of one tick
//! interval and ticks the scheduler on every wake-up. Control messages wake
//! it early, so a stop request takes effect at once instead of after the
//! next tick.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::clock::AudioClock;
use super::scheduler::{BeatScheduler, PulseSink, SchedulerConfig};

/// Messages to the tick thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    SetTempo(u32),
    SetMuted(bool),
    Stop,
}

/// Runs a [`BeatScheduler`] on its own thread
pub struct MetronomeRunner {
    config: SchedulerConfig,
    tempo: u32,
    muted: bool,
    control: Option<Sender<Control>>,
    handle: Option<JoinHandle<()>>,
}

impl MetronomeRunner {
    /// Create a stopped runner
    pub fn new(tempo: u32) -> Self {
        Self::with_config(tempo, SchedulerConfig::default())
    }

    /// Create runner with custom config
    pub fn with_config(tempo: u32, config: SchedulerConfig) -> Self {
        Self {
            config,
            tempo,
            muted: false,
            control: None,
            handle: None,
        }
    }

    /// Start ticking against `clock`, queuing pulses into `sink`.
    ///
    /// Does nothing when already running.
    pub fn start<C, S>(&mut self, clock: C, sink: S)
    where
        C: AudioClock + Send + 'static,
        S: PulseSink + Send + 'static,
    {
        if self.is_running() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let config = self.config;
        let tempo = self.tempo;
        let muted = self.muted;

        let handle = thread::spawn(move || {
            let mut scheduler = BeatScheduler::with_config(clock, sink, tempo, config);
            scheduler.set_muted(muted);
            scheduler.start();

            loop {
                scheduler.tick();
                match rx.recv_timeout(config.tick_interval) {
                    Ok(Control::SetTempo(tempo)) => scheduler.set_tempo(tempo),
                    Ok(Control::SetMuted(muted)) => scheduler.set_muted(muted),
                    Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => {
                        scheduler.stop();
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            debug!("tick thread exited");
        });

        self.control = Some(tx);
        self.handle = Some(handle);
    }

    /// Stop the tick thread and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(control) = self.control.take() {
            let _ = control.send(Control::Stop);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Metronome tick thread panicked");
            }
        }
    }

    /// Check if the tick thread is running
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Set tempo, forwarded to a running scheduler
    pub fn set_tempo(&mut self, tempo: u32) {
        self.tempo = tempo;
        self.send(Control::SetTempo(tempo));
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Mute or unmute, forwarded to a running scheduler
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.send(Control::SetMuted(muted));
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn send(&self, message: Control) {
        if let Some(control) = &self.control {
            let _ = control.send(message);
        }
    }
}

impl Drop for MetronomeRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
