//! Pending note releases, ordered by audio-clock time.
//!
//! Releases are kept sorted on insert so that draining the due ones is a
//! prefix split. Equal times keep insertion order.

use super::types::NoteRelease;

/// A time-ordered queue of note-offs.
#[derive(Debug, Default)]
pub struct ReleaseTimeline {
    releases: Vec<NoteRelease>,
}

impl ReleaseTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a release, maintaining sorted order.
    pub fn insert(&mut self, release: NoteRelease) {
        let pos = self.releases.partition_point(|r| r.time <= release.time);
        self.releases.insert(pos, release);
    }

    /// Remove and return every release with `time <= now`, in time order.
    pub fn drain_due(&mut self, now: f64) -> Vec<NoteRelease> {
        let split = self.releases.partition_point(|r| r.time <= now);
        self.releases.drain(..split).collect()
    }

    /// Time of the earliest pending release.
    pub fn next_due(&self) -> Option<f64> {
        self.releases.first().map(|r| r.time)
    }

    /// Drop every pending release without firing it.
    pub fn clear(&mut self) {
        self.releases.clear();
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
