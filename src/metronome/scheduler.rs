// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lookahead beat scheduler.
//!
//! A coarse timer calls [`BeatScheduler::tick`] roughly every 25 ms. Each tick
//! queues every beat that falls inside the next 100 ms on the audio clock,
//! stamped with its exact time, and leaves the precise onset to whatever
//! renders the pulses. Late or early ticks only change how far ahead pulses
//! are queued, never when they sound.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use super::click::ClickTone;
use super::clock::AudioClock;

/// Coarse timer period
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// How far ahead of the clock pulses are queued
pub const SCHEDULE_AHEAD: Duration = Duration::from_millis(100);

/// A click to be rendered at an exact clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Onset on the audio clock, in seconds
    pub at: f64,
    /// Beat number since start (0-indexed)
    pub beat: u64,
    /// Sound of the click
    pub tone: ClickTone,
}

/// Receiver of scheduled pulses
pub trait PulseSink {
    /// Queue a pulse; queued pulses cannot be taken back
    fn schedule(&mut self, pulse: Pulse);
}

/// Sink that records pulses, shared between clones
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pulses: Arc<Mutex<Vec<Pulse>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every pulse received so far
    pub fn pulses(&self) -> Vec<Pulse> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of pulses received so far
    pub fn len(&self) -> usize {
        self.pulses.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PulseSink for RecordingSink {
    fn schedule(&mut self, pulse: Pulse) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(pulse);
        }
    }
}

/// Configuration for the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Coarse timer period
    pub tick_interval: Duration,
    /// Lookahead window
    pub schedule_ahead: Duration,
    /// Click sound
    pub tone: ClickTone,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            schedule_ahead: SCHEDULE_AHEAD,
            tone: ClickTone::default(),
        }
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Metronome beat scheduler
#[derive(Debug)]
pub struct BeatScheduler<C: AudioClock, S: PulseSink> {
    clock: C,
    sink: S,
    config: SchedulerConfig,
    /// Tempo in BPM; 0 means no beats
    tempo: u32,
    muted: bool,
    state: SchedulerState,
    /// Clock time of the next beat
    next_pulse_time: f64,
    /// Beats advanced since start
    beat: u64,
}

impl<C: AudioClock, S: PulseSink> BeatScheduler<C, S> {
    /// Create a stopped scheduler
    pub fn new(clock: C, sink: S, tempo: u32) -> Self {
        Self::with_config(clock, sink, tempo, SchedulerConfig::default())
    }

    /// Create scheduler with custom config
    pub fn with_config(clock: C, sink: S, tempo: u32, config: SchedulerConfig) -> Self {
        Self {
            clock,
            sink,
            config,
            tempo,
            muted: false,
            state: SchedulerState::Stopped,
            next_pulse_time: 0.0,
            beat: 0,
        }
    }

    /// Start scheduling from the clock's current time
    pub fn start(&mut self) {
        if self.state == SchedulerState::Running {
            return;
        }
        self.state = SchedulerState::Running;
        self.next_pulse_time = self.clock.now();
        self.beat = 0;
        info!(tempo = self.tempo, at = self.next_pulse_time, "Metronome started");
    }

    /// Stop scheduling. Pulses already queued still sound.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        self.state = SchedulerState::Stopped;
        info!(beats = self.beat, "Metronome stopped");
    }

    /// Queue every beat inside the lookahead window; returns pulses queued
    pub fn tick(&mut self) -> usize {
        if self.state != SchedulerState::Running {
            return 0;
        }

        let now = self.clock.now();
        let Some(interval) = self.beat_interval() else {
            // Keep the next beat pinned to now so a later tempo does not
            // fire a burst of overdue beats
            self.next_pulse_time = self.next_pulse_time.max(now);
            return 0;
        };

        let horizon = now + self.config.schedule_ahead.as_secs_f64();
        let mut queued = 0;
        while self.next_pulse_time < horizon {
            if !self.muted {
                self.sink.schedule(Pulse {
                    at: self.next_pulse_time,
                    beat: self.beat,
                    tone: self.config.tone,
                });
                queued += 1;
            }
            self.next_pulse_time += interval;
            self.beat += 1;
        }

        if queued > 0 {
            debug!(queued, next = self.next_pulse_time, "pulses queued");
        }
        queued
    }

    /// Seconds between beats, `None` at tempo 0
    pub fn beat_interval(&self) -> Option<f64> {
        (self.tempo > 0).then(|| 60.0 / self.tempo as f64)
    }

    /// Change tempo; applies from the next computed interval
    pub fn set_tempo(&mut self, tempo: u32) {
        self.tempo = tempo;
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Mute or unmute; muted beats advance without producing pulses
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Clock time of the next unqueued beat
    pub fn next_pulse_time(&self) -> f64 {
        self.next_pulse_time
    }

    /// Coarse timer period
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metronome::clock::ManualClock;

    fn scheduler(tempo: u32) -> (BeatScheduler<ManualClock, RecordingSink>, ManualClock, RecordingSink) {
        let clock = ManualClock::new();
        let sink = RecordingSink::new();
        (BeatScheduler::new(clock.clone(), sink.clone(), tempo), clock, sink)
    }

    /// Tick every `step` seconds until `until`
    fn run(s: &mut BeatScheduler<ManualClock, RecordingSink>, clock: &ManualClock, step: f64, until: f64) {
        while clock.now() < until {
            s.tick();
            clock.advance(step);
        }
    }

    #[test]
    fn test_stopped_does_nothing() {
        let (mut s, _, sink) = scheduler(120);
        assert_eq!(s.tick(), 0);
        assert!(sink.is_empty());
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_first_pulse_at_start_time() {
        let (mut s, clock, sink) = scheduler(120);
        clock.set(2.0);
        s.start();
        assert_eq!(s.tick(), 1);
        assert_eq!(sink.pulses()[0].at, 2.0);
        assert_eq!(sink.pulses()[0].beat, 0);
    }

    #[test]
    fn test_pulse_spacing() {
        let (mut s, clock, sink) = scheduler(120);
        s.start();
        run(&mut s, &clock, 0.025, 3.0);

        let pulses = sink.pulses();
        for pair in pulses.windows(2) {
            assert!((pair[1].at - pair[0].at - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_jittery_ticks_keep_exact_times() {
        let (mut s, clock, sink) = scheduler(100);
        s.start();
        // Uneven timer: 10ms, 40ms, 25ms, ...
        let steps = [0.010, 0.040, 0.025, 0.060, 0.015];
        let mut i = 0;
        while clock.now() < 6.0 {
            s.tick();
            clock.advance(steps[i % steps.len()]);
            i += 1;
        }

        for (n, pulse) in sink.pulses().iter().enumerate() {
            assert!((pulse.at - n as f64 * 0.6).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lookahead_window() {
        let (mut s, clock, sink) = scheduler(600); // 100ms beats
        s.start();
        s.tick();
        // Beat at 0.0 queued, 0.1 is outside [now, now + 0.1)
        assert_eq!(sink.len(), 1);
        clock.advance(0.001);
        s.tick();
        assert_eq!(sink.len(), 2);
        assert!(sink.pulses().iter().all(|p| p.at < clock.now() + 0.1));
    }

    #[test]
    fn test_stop_and_restart_reseeds() {
        let (mut s, clock, sink) = scheduler(120);
        s.start();
        run(&mut s, &clock, 0.025, 1.0);
        s.stop();
        let queued = sink.len();

        clock.advance(0.25);
        assert_eq!(s.tick(), 0);
        assert_eq!(sink.len(), queued);

        let restart = clock.now();
        s.start();
        s.tick();
        let last = sink.pulses()[sink.len() - 1];
        assert_eq!(last.at, restart);
        assert_eq!(last.beat, 0);
    }

    #[test]
    fn test_mute_suppresses_pulses() {
        let (mut s, clock, sink) = scheduler(120);
        s.set_muted(true);
        s.start();
        run(&mut s, &clock, 0.025, 1.0);
        assert!(sink.is_empty());

        // Beats kept advancing while muted
        s.set_muted(false);
        run(&mut s, &clock, 0.025, 1.6);
        let first = sink.pulses()[0];
        assert!(first.beat >= 2);
        assert!((first.at - first.beat as f64 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_applies_to_next_interval() {
        let (mut s, clock, sink) = scheduler(120);
        s.start();
        s.tick(); // beat at 0.0, next at 0.5
        s.set_tempo(60);
        clock.set(0.45);
        s.tick(); // beat at 0.5 still on the old grid, next at 1.5
        assert_eq!(s.next_pulse_time(), 1.5);
        assert_eq!(sink.pulses()[1].at, 0.5);
    }

    #[test]
    fn test_zero_tempo() {
        let (mut s, clock, sink) = scheduler(0);
        s.start();
        run(&mut s, &clock, 0.025, 2.0);
        assert!(sink.is_empty());
        assert!(s.beat_interval().is_none());

        // No burst of overdue beats once a tempo is set
        s.set_tempo(120);
        s.tick();
        assert_eq!(sink.len(), 1);
        assert!(sink.pulses()[0].at >= 1.9);
    }

    #[test]
    fn test_start_twice_keeps_grid() {
        let (mut s, clock, _) = scheduler(120);
        s.start();
        s.tick();
        clock.advance(0.3);
        s.start();
        assert_eq!(s.next_pulse_time(), 0.5);
    }
}
