//! Note events at each stage of the pipeline.
//!
//! Agents emit [`AgentNoteEvent`]s in beat terms. The scheduler pins each one
//! to the audio clock as a [`ScheduledNote`] and queues a matching
//! [`NoteRelease`].

use serde::Serialize;

use crate::ensemble::InstrumentKey;
use crate::performer::PerformerId;

/// A note as emitted by a performer on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentNoteEvent {
    pub performer_id: PerformerId,
    /// MIDI note number. Never a rest.
    pub pitch: u8,
    /// Length in eighth notes, at least 1.
    pub duration: u32,
    /// `[0.3, 1.0]`, or exactly 1.0 with velocity humanization off.
    pub velocity: f64,
    /// Seconds, `[-0.05, 0.05]`; positive is late.
    pub timing_offset: f64,
}

/// A note pinned to an absolute audio-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledNote {
    /// Audio-clock seconds.
    pub time: f64,
    pub performer_id: PerformerId,
    pub pitch: u8,
    pub velocity: f64,
    pub duration_secs: f64,
    pub duration_eighths: u32,
    pub instrument: InstrumentKey,
}

impl ScheduledNote {
    pub fn end_time(&self) -> f64 {
        self.time + self.duration_secs
    }

    pub fn frequency(&self) -> f64 {
        crate::score::midi_to_frequency(self.pitch)
    }

    pub fn release(&self) -> NoteRelease {
        NoteRelease {
            time: self.end_time(),
            performer_id: self.performer_id,
            pitch: self.pitch,
            instrument: self.instrument,
        }
    }
}

/// A pending note-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteRelease {
    pub time: f64,
    pub performer_id: PerformerId,
    pub pitch: u8,
    pub instrument: InstrumentKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn release_lands_at_end_of_note() {
        let note = ScheduledNote {
            time: 1.25,
            performer_id: PerformerId(2),
            pitch: 69,
            velocity: 0.8,
            duration_secs: 0.5,
            duration_eighths: 2,
            instrument: InstrumentKey::Marimba,
        };
        let release = note.release();
        assert_approx_eq!(release.time, 1.75, 1e-12);
        assert_eq!(release.pitch, 69);
        assert_eq!(release.instrument, InstrumentKey::Marimba);
        assert_approx_eq!(note.frequency(), 440.0, 1e-9);
    }
}
