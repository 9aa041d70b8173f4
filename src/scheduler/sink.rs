//! Sound-producing collaborators.
//!
//! The scheduler never makes sound itself. It hands pinned notes, releases
//! and pulses to a [`NoteSink`]; what the sink does with them (OSC, a synth,
//! a log line, a test recorder) is its own business.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ensemble::InstrumentKey;
use crate::event::{NoteRelease, ScheduledNote};

/// Receives scheduled notes. Only `note_on` is required.
pub trait NoteSink {
    fn note_on(&mut self, note: &ScheduledNote);

    fn note_off(&mut self, _release: &NoteRelease) {}

    /// One reference-pulse tick at `time`, one beat long.
    fn pulse(&mut self, _time: f64, _duration: f64) {}

    /// Cut every sounding note immediately.
    fn silence_all(&mut self) {}

    fn name(&self) -> &str;
}

impl<S: NoteSink + ?Sized> NoteSink for Box<S> {
    fn note_on(&mut self, note: &ScheduledNote) {
        (**self).note_on(note)
    }

    fn note_off(&mut self, release: &NoteRelease) {
        (**self).note_off(release)
    }

    fn pulse(&mut self, time: f64, duration: f64) {
        (**self).pulse(time, duration)
    }

    fn silence_all(&mut self) {
        (**self).silence_all()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Routes notes to a sink per instrument family.
pub struct NoteRouter {
    routes: HashMap<InstrumentKey, usize>,
    sinks: Vec<Box<dyn NoteSink>>,
    fallback: Option<usize>,
}

impl NoteRouter {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            sinks: Vec::new(),
            fallback: None,
        }
    }

    /// Send every note for `key` to `sink`.
    pub fn add_route(&mut self, key: InstrumentKey, sink: Box<dyn NoteSink>) {
        let idx = self.sinks.len();
        self.sinks.push(sink);
        self.routes.insert(key, idx);
    }

    /// Send notes with no explicit route to `sink`. Also receives pulses.
    pub fn with_fallback(mut self, sink: Box<dyn NoteSink>) -> Self {
        let idx = self.sinks.len();
        self.sinks.push(sink);
        self.fallback = Some(idx);
        self
    }

    fn target(&mut self, key: InstrumentKey) -> Option<&mut Box<dyn NoteSink>> {
        let idx = self.routes.get(&key).copied().or(self.fallback)?;
        self.sinks.get_mut(idx)
    }
}

impl Default for NoteRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteSink for NoteRouter {
    fn note_on(&mut self, note: &ScheduledNote) {
        if let Some(sink) = self.target(note.instrument) {
            sink.note_on(note);
        }
    }

    fn note_off(&mut self, release: &NoteRelease) {
        if let Some(sink) = self.target(release.instrument) {
            sink.note_off(release);
        }
    }

    fn pulse(&mut self, time: f64, duration: f64) {
        if let Some(sink) = self.fallback.and_then(|i| self.sinks.get_mut(i)) {
            sink.pulse(time, duration);
        }
    }

    fn silence_all(&mut self) {
        for sink in &mut self.sinks {
            sink.silence_all();
        }
    }

    fn name(&self) -> &str {
        "router"
    }
}

/// Writes every note to the log at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl NoteSink for LogSink {
    fn note_on(&mut self, note: &ScheduledNote) {
        log::debug!(
            "{:>8.3}s {} {} midi {} vel {:.2} for {:.3}s",
            note.time,
            note.performer_id,
            note.instrument.name(),
            note.pitch,
            note.velocity,
            note.duration_secs
        );
    }

    fn note_off(&mut self, release: &NoteRelease) {
        log::trace!("{:>8.3}s {} off {}", release.time, release.performer_id, release.pitch);
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Everything a sink can be asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    NoteOn(ScheduledNote),
    NoteOff(NoteRelease),
    Pulse { time: f64, duration: f64 },
    SilenceAll,
}

/// Keeps every call in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<SinkEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.borrow().clone()
    }

    pub fn notes(&self) -> Vec<ScheduledNote> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::NoteOn(note) => Some(*note),
                _ => None,
            })
            .collect()
    }

    pub fn releases(&self) -> Vec<NoteRelease> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::NoteOff(release) => Some(*release),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, event: SinkEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl NoteSink for Recorder {
    fn note_on(&mut self, note: &ScheduledNote) {
        self.push(SinkEvent::NoteOn(*note));
    }

    fn note_off(&mut self, release: &NoteRelease) {
        self.push(SinkEvent::NoteOff(*release));
    }

    fn pulse(&mut self, time: f64, duration: f64) {
        self.push(SinkEvent::Pulse { time, duration });
    }

    fn silence_all(&mut self) {
        self.push(SinkEvent::SilenceAll);
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performer::PerformerId;

    fn note(instrument: InstrumentKey) -> ScheduledNote {
        ScheduledNote {
            time: 0.0,
            performer_id: PerformerId(0),
            pitch: 60,
            velocity: 1.0,
            duration_secs: 0.25,
            duration_eighths: 1,
            instrument,
        }
    }

    #[test]
    fn router_dispatches_by_instrument() {
        let synth = Recorder::new();
        let piano = Recorder::new();
        let mut router = NoteRouter::new();
        router.add_route(InstrumentKey::Synth, Box::new(synth.clone()));
        router.add_route(InstrumentKey::Piano, Box::new(piano.clone()));

        router.note_on(&note(InstrumentKey::Synth));
        router.note_on(&note(InstrumentKey::Piano));
        router.note_on(&note(InstrumentKey::Piano));
        // no route, no fallback: dropped
        router.note_on(&note(InstrumentKey::Marimba));

        assert_eq!(synth.notes().len(), 1);
        assert_eq!(piano.notes().len(), 2);
    }

    #[test]
    fn router_fallback_catches_unrouted() {
        let synth = Recorder::new();
        let rest = Recorder::new();
        let mut router = NoteRouter::new().with_fallback(Box::new(rest.clone()));
        router.add_route(InstrumentKey::Synth, Box::new(synth.clone()));

        router.note_on(&note(InstrumentKey::Marimba));
        router.note_off(&note(InstrumentKey::Marimba).release());
        router.pulse(1.0, 0.25);

        assert!(synth.is_empty());
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn router_silences_every_sink() {
        let a = Recorder::new();
        let b = Recorder::new();
        let mut router = NoteRouter::new().with_fallback(Box::new(b.clone()));
        router.add_route(InstrumentKey::Synth, Box::new(a.clone()));
        router.silence_all();
        assert_eq!(a.events(), vec![SinkEvent::SilenceAll]);
        assert_eq!(b.events(), vec![SinkEvent::SilenceAll]);
    }

    #[test]
    fn recorder_clones_share_log() {
        let recorder = Recorder::new();
        let mut sink = recorder.clone();
        sink.note_on(&note(InstrumentKey::Synth));
        sink.pulse(0.0, 0.25);
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.notes().len(), 1);
        recorder.clear();
        assert!(sink.is_empty());
    }
}
