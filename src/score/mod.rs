//! Score data — patterns of notes that performers walk through.
//!
//! Patterns are produced outside the simulation (the bundled [`in_c`] score
//! or any external generator) and are read-only once handed to an
//! [`Ensemble`](crate::ensemble::Ensemble).

pub mod in_c;

use serde::{Deserialize, Serialize};

/// Pitch of a note: a MIDI note number or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pitch {
    Rest,
    Midi(u8),
}

impl Pitch {
    /// Interpret a MIDI number, treating 0 as a rest.
    pub fn from_midi(midi: u8) -> Self {
        if midi == 0 {
            Pitch::Rest
        } else {
            Pitch::Midi(midi)
        }
    }

    pub fn is_rest(self) -> bool {
        matches!(self, Pitch::Rest)
    }
}

/// A single note. `duration` is in eighth notes and is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: u32,
}

impl Note {
    /// Create a note from a MIDI number (0 = rest) and an eighth-note duration.
    pub fn new(midi: u8, duration: u32) -> Self {
        Self {
            pitch: Pitch::from_midi(midi),
            duration: duration.max(1),
        }
    }

    /// Create a rest.
    pub fn rest(duration: u32) -> Self {
        Self {
            pitch: Pitch::Rest,
            duration: duration.max(1),
        }
    }
}

/// An ordered cell of notes that a performer repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    id: u32,
    notes: Vec<Note>,
}

impl Pattern {
    pub fn new(id: u32, notes: Vec<Note>) -> Self {
        Self { id, notes }
    }

    /// Display id (1-based for the bundled score).
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total length of one pass through the pattern, in eighth notes.
    pub fn length_in_eighths(&self) -> u32 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

/// Convert a MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
pub fn midi_to_frequency(midi: u8) -> f64 {
    440.0 * 2.0_f64.powf((midi as f64 - 69.0) / 12.0)
}
