//! Mutable per-performer state, advanced once per tick.

use serde::Serialize;

/// Identifies a performer. Ids are never reused within an ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PerformerId(pub u32);

impl std::fmt::Display for PerformerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Where a performer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Playing,
    Silent,
    /// Terminal.
    Complete,
}

/// Everything about a performer that changes while it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    pub id: PerformerId,
    pub pattern_index: usize,
    pub note_index: usize,
    pub repetitions_remaining: u32,
    pub total_repetitions: u32,
    pub status: Status,
    pub beats_silent: u32,
    pub beats_since_last_dropout: u32,
    /// Beats left to sustain the note currently sounding.
    pub beats_in_current_note: u32,
    /// Beats to wait before the first note.
    pub entry_delay: u32,
    /// Ticks seen so far; doubles as the beat index for swing.
    pub tick_count: u64,
}

/// Starting value for `beats_since_last_dropout`, so an early dropout is possible.
pub const INITIAL_BEATS_SINCE_DROPOUT: u32 = 100;

impl AgentState {
    pub fn new(id: PerformerId, repetitions: u32) -> Self {
        Self {
            id,
            pattern_index: 0,
            note_index: 0,
            repetitions_remaining: repetitions,
            total_repetitions: repetitions,
            status: Status::Playing,
            beats_silent: 0,
            beats_since_last_dropout: INITIAL_BEATS_SINCE_DROPOUT,
            beats_in_current_note: 0,
            entry_delay: 0,
            tick_count: 0,
        }
    }

    /// 1-based repetition currently being played.
    pub fn current_repetition(&self) -> u32 {
        (self.total_repetitions.saturating_sub(self.repetitions_remaining) + 1)
            .min(self.total_repetitions.max(1))
    }

    pub fn is_playing(&self) -> bool {
        self.status == Status::Playing
    }
}
