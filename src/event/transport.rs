//! Transport state — play/stop control and the next beat's clock time.
//!
//! Time here is audio-clock seconds, not samples. Each beat (one eighth
//! note) advances the next event time by `60 / (bpm × 2)` scaled by the
//! current tempo multiplier, so a tempo change only affects beats not yet
//! scheduled.

/// Slowest allowed tempo.
pub const MIN_BPM: f64 = 100.0;
/// Fastest allowed tempo.
pub const MAX_BPM: f64 = 180.0;
pub const DEFAULT_BPM: f64 = 120.0;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Tempo, play state and the time of the next beat.
#[derive(Debug)]
pub struct Transport {
    bpm: f64,
    state: PlayState,
    next_event_time: f64,
}

impl Transport {
    /// Create a stopped transport. `bpm` is clamped to the allowed range.
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm: clamp_bpm(bpm),
            state: PlayState::Stopped,
            next_event_time: 0.0,
        }
    }

    /// Start playing; the first beat is due at `now`.
    pub fn play(&mut self, now: f64) {
        self.state = PlayState::Playing;
        self.next_event_time = now;
    }

    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    /// Stop and rewind the beat clock.
    pub fn reset(&mut self) {
        self.state = PlayState::Stopped;
        self.next_event_time = 0.0;
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set a new tempo, clamped. Takes effect from the next `advance` call.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = clamp_bpm(bpm);
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn seconds_per_eighth(&self) -> f64 {
        60.0 / (self.bpm * 2.0)
    }

    /// Length of one beat under the given tempo multiplier.
    pub fn beat_duration(&self, tempo_multiplier: f64) -> f64 {
        self.seconds_per_eighth() * tempo_multiplier
    }

    /// Move the next event time forward by one beat.
    pub fn advance(&mut self, tempo_multiplier: f64) {
        self.next_event_time += self.beat_duration(tempo_multiplier);
    }
}

fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_finite() {
        bpm.clamp(MIN_BPM, MAX_BPM)
    } else {
        DEFAULT_BPM
    }
}
