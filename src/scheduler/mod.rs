//! Lookahead scheduler — paces ensemble ticks against an audio clock.
//!
//! Every poll looks [`SCHEDULE_AHEAD_TIME`] into the future. Each beat whose
//! start time falls inside that window is ticked, its notes are pinned to
//! clock time and handed to the sink, and a release is queued for each one.
//! The next beat time then advances by one eighth note scaled by the
//! ensemble's rubato multiplier.
//!
//! The scheduler is single-threaded. Nothing inside a tick suspends; the
//! only suspension point is between polls.

pub mod clock;
pub mod sink;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use sink::{LogSink, NoteRouter, NoteSink, Recorder, SinkEvent};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::ensemble::{Ensemble, InstrumentKey, PerformerState};
use crate::event::{AgentNoteEvent, PlayState, ReleaseTimeline, ScheduledNote, Transport};

/// How far ahead of the clock beats are scheduled, in seconds.
pub const SCHEDULE_AHEAD_TIME: f64 = 0.1;

/// Interval between polls in real-time mode.
pub const TIMER_INTERVAL: Duration = Duration::from_millis(25);

/// Snapshot of the engine for display collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub playing: bool,
    pub bpm: f64,
    pub performers: Vec<PerformerState>,
    pub ensemble_complete: bool,
    pub pulse_enabled: bool,
    pub performer_count: usize,
    /// Current rubato-scaled beat length, in seconds.
    pub beat_duration: f64,
}

/// Callback invoked after every state change.
pub type StateCallback = Box<dyn FnMut(&EngineState)>;

/// Drives an [`Ensemble`] on a clock and forwards its notes to a sink.
pub struct Scheduler<C: AudioClock> {
    ensemble: Ensemble,
    clock: C,
    transport: Transport,
    releases: ReleaseTimeline,
    sink: Box<dyn NoteSink>,
    default_bpm: f64,
    pulse_enabled: bool,
    beats_scheduled: u64,
    on_state_change: Option<StateCallback>,
}

impl<C: AudioClock> Scheduler<C> {
    /// Create a stopped scheduler. `bpm` is clamped and also becomes the
    /// tempo restored by [`reset`](Self::reset).
    pub fn new(ensemble: Ensemble, clock: C, sink: Box<dyn NoteSink>, bpm: f64) -> Self {
        let transport = Transport::new(bpm);
        let default_bpm = transport.bpm();
        Self {
            ensemble,
            clock,
            transport,
            releases: ReleaseTimeline::new(),
            sink,
            default_bpm,
            pulse_enabled: false,
            beats_scheduled: 0,
            on_state_change: None,
        }
    }

    pub fn with_pulse(mut self, enabled: bool) -> Self {
        self.pulse_enabled = enabled;
        self
    }

    pub fn set_on_state_change(&mut self, callback: StateCallback) {
        self.on_state_change = Some(callback);
    }

    /// Start scheduling from the current clock time. No-op while playing.
    pub fn start(&mut self) {
        if self.transport.is_playing() {
            return;
        }
        self.transport.play(self.clock.now());
        log::info!(
            "playing {} performers at {} bpm",
            self.ensemble.agent_count(),
            self.transport.bpm()
        );
        self.notify_state_change();
    }

    /// Stop ticking. Already-scheduled notes still receive their releases.
    pub fn stop(&mut self) {
        if !self.transport.is_playing() {
            return;
        }
        self.transport.stop();
        log::info!("stopped after {} beats", self.beats_scheduled);
        self.notify_state_change();
    }

    /// Stop, cancel pending releases, silence the sink and rewind the ensemble.
    pub fn reset(&mut self) {
        self.transport.reset();
        self.releases.clear();
        self.sink.silence_all();
        self.ensemble.reset();
        self.transport.set_bpm(self.default_bpm);
        self.beats_scheduled = 0;
        log::info!("reset");
        self.notify_state_change();
    }

    /// Change tempo, clamped. Applies from the next beat interval.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.transport.set_bpm(bpm);
        log::info!("tempo {} bpm", self.transport.bpm());
        self.notify_state_change();
    }

    /// Flip the reference pulse. Returns the new setting.
    pub fn toggle_pulse(&mut self) -> bool {
        self.pulse_enabled = !self.pulse_enabled;
        self.notify_state_change();
        self.pulse_enabled
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            playing: self.transport.is_playing(),
            bpm: self.transport.bpm(),
            performers: self.ensemble.performer_states(),
            ensemble_complete: self.ensemble.is_complete(),
            pulse_enabled: self.pulse_enabled,
            performer_count: self.ensemble.agent_count(),
            beat_duration: self.beat_duration(),
        }
    }

    /// Deliver the current state to the registered callback, if any.
    pub fn notify_state_change(&mut self) {
        if self.on_state_change.is_none() {
            return;
        }
        let state = self.state();
        if let Some(callback) = self.on_state_change.as_mut() {
            callback(&state);
        }
    }

    /// Beat length under the current tempo and rubato.
    pub fn beat_duration(&self) -> f64 {
        self.transport.beat_duration(self.ensemble.tempo_multiplier())
    }

    pub fn play_state(&self) -> PlayState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Stopped with no releases left to fire.
    pub fn is_idle(&self) -> bool {
        !self.transport.is_playing() && self.releases.is_empty()
    }

    pub fn bpm(&self) -> f64 {
        self.transport.bpm()
    }

    pub fn pulse_enabled(&self) -> bool {
        self.pulse_enabled
    }

    pub fn beats_scheduled(&self) -> u64 {
        self.beats_scheduled
    }

    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }

    pub fn next_event_time(&self) -> f64 {
        self.transport.next_event_time()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn ensemble_mut(&mut self) -> &mut Ensemble {
        &mut self.ensemble
    }

    /// Fire due releases, then schedule every beat inside the lookahead window.
    ///
    /// Returns the number of beats scheduled by this poll.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        for release in self.releases.drain_due(now) {
            self.sink.note_off(&release);
        }

        let mut scheduled = 0;
        while self.transport.is_playing()
            && self.transport.next_event_time() < now + SCHEDULE_AHEAD_TIME
        {
            let time = self.transport.next_event_time();
            self.schedule_beat(time, now);
            self.transport.advance(self.ensemble.tempo_multiplier());
            scheduled += 1;
        }
        scheduled
    }

    fn schedule_beat(&mut self, time: f64, now: f64) {
        let events = self.ensemble.tick(self.transport.bpm());
        let seconds_per_eighth = self.transport.seconds_per_eighth();

        for event in &events {
            let note = self.pin(event, time, now, seconds_per_eighth);
            self.sink.note_on(&note);
            self.releases.insert(note.release());
        }
        if self.pulse_enabled {
            self.sink.pulse(time, seconds_per_eighth);
        }
        self.beats_scheduled += 1;

        if self.ensemble.is_complete() {
            log::info!("ensemble complete at beat {}", self.beats_scheduled);
            self.transport.stop();
        }
        self.notify_state_change();
    }

    fn pin(&self, event: &AgentNoteEvent, time: f64, now: f64, seconds_per_eighth: f64) -> ScheduledNote {
        ScheduledNote {
            time: (time + event.timing_offset).max(now),
            performer_id: event.performer_id,
            pitch: event.pitch,
            velocity: event.velocity,
            duration_secs: event.duration as f64 * seconds_per_eighth,
            duration_eighths: event.duration,
            instrument: InstrumentKey::for_performer(event.performer_id),
        }
    }
}

impl Scheduler<SystemClock> {
    /// Real-time loop: poll every [`TIMER_INTERVAL`] until stopped and drained.
    ///
    /// Setting `stop_requested` stops ticking; the loop then keeps running
    /// until every pending release has fired.
    pub fn run(&mut self, stop_requested: &AtomicBool) {
        self.start();
        loop {
            if stop_requested.load(Ordering::SeqCst) && self.transport.is_playing() {
                log::info!("stop requested");
                self.stop();
            }
            self.poll();
            if self.is_idle() {
                break;
            }
            std::thread::sleep(TIMER_INTERVAL);
        }
    }
}

impl Scheduler<ManualClock> {
    /// Offline loop: advance the virtual clock in [`TIMER_INTERVAL`] steps.
    ///
    /// Stops after `max_beats` beats (or on completion) and then lets every
    /// release fire. Returns the number of beats scheduled.
    pub fn run_virtual(&mut self, max_beats: u64) -> u64 {
        let step = TIMER_INTERVAL.as_secs_f64();
        self.start();
        loop {
            self.poll();
            if self.transport.is_playing() && self.beats_scheduled >= max_beats {
                self.stop();
            }
            if self.is_idle() {
                break;
            }
            self.clock.advance(step);
        }
        self.beats_scheduled
    }
}
