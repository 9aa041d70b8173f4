//! Event plumbing between the ensemble and the sinks.
//!
//! [`Transport`] tracks tempo and the clock time of the next beat,
//! [`ReleaseTimeline`] holds pending note-offs, and the types in [`types`]
//! carry notes from agent output to scheduled playback.

pub mod timeline;
pub mod transport;
pub mod types;

pub use timeline::ReleaseTimeline;
pub use transport::{PlayState, Transport, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use types::{AgentNoteEvent, NoteRelease, ScheduledNote};
