//! Scheduler pipeline tests — ensemble → lookahead scheduler → sink, on a
//! virtual clock so nothing depends on wall time.

use assert_approx_eq::assert_approx_eq;

use ostinato::ensemble::InstrumentKey;
use ostinato::event::PlayState;
use ostinato::humanize::Humanization;
use ostinato::scheduler::{
    AudioClock, ManualClock, NoteRouter, Recorder, SinkEvent, SCHEDULE_AHEAD_TIME,
};
use ostinato::score::{in_c, Note, Pattern};
use ostinato::{Ensemble, EnsembleConfig, Scheduler, SeededRng, Session};

const STEP: f64 = 0.025;

/// Helper: a scheduler over the full score with a recording sink.
fn pipeline(seed: u32, humanization: Humanization) -> (Scheduler<ManualClock>, ManualClock, Recorder) {
    let clock = ManualClock::new();
    let recorder = Recorder::new();
    let ensemble = Ensemble::new(6, in_c::patterns(), SeededRng::new(seed))
        .with_humanization(humanization);
    let scheduler = Scheduler::new(ensemble, clock.clone(), Box::new(recorder.clone()), 120.0);
    (scheduler, clock, recorder)
}

/// Helper: poll every `STEP` seconds for `seconds` of virtual time.
fn play_for(scheduler: &mut Scheduler<ManualClock>, clock: &ManualClock, seconds: f64) {
    let steps = (seconds / STEP).round() as usize;
    for _ in 0..steps {
        scheduler.poll();
        clock.advance(STEP);
    }
}

// =============================================================================
// Pacing
// =============================================================================

#[test]
fn beats_track_the_clock() {
    let (mut s, clock, _) = pipeline(1, Humanization::off());
    s.start();
    play_for(&mut s, &clock, 10.0);
    // 120 bpm is four eighths a second, plus up to one lookahead window
    let beats = s.beats_scheduled();
    assert!((40..=42).contains(&beats), "{beats} beats in 10s");
}

#[test]
fn notes_are_never_in_the_past_or_beyond_lookahead() {
    let (mut s, clock, recorder) = pipeline(9, Humanization::default());
    s.start();
    for _ in 0..2000 {
        let now = clock.now();
        let before = recorder.notes().len();
        s.poll();
        for note in &recorder.notes()[before..] {
            assert!(note.time >= now, "note at {} scheduled at {now}", note.time);
            assert!(note.time < now + SCHEDULE_AHEAD_TIME + 0.05 + 1e-9);
        }
        clock.advance(STEP);
    }
}

#[test]
fn tempo_change_applies_to_following_beats() {
    let (mut s, clock, _) = pipeline(2, Humanization::off());
    s.start();
    play_for(&mut s, &clock, 5.0);
    let slow = s.beats_scheduled();
    s.set_bpm(180.0);
    play_for(&mut s, &clock, 5.0);
    let fast = s.beats_scheduled() - slow;
    assert!((28..=31).contains(&fast), "{fast} beats at 180 bpm");
}

#[test]
fn note_durations_follow_tempo() {
    let (mut s, clock, recorder) = pipeline(4, Humanization::off());
    s.start();
    play_for(&mut s, &clock, 20.0);
    let spe = 60.0 / (120.0 * 2.0);
    for note in recorder.notes() {
        assert_approx_eq!(note.duration_secs, note.duration_eighths as f64 * spe, 1e-9);
        assert_eq!(note.instrument, InstrumentKey::for_performer(note.performer_id));
    }
}

// =============================================================================
// Releases
// =============================================================================

#[test]
fn every_note_is_released_after_stop() {
    let (mut s, clock, recorder) = pipeline(5, Humanization::default());
    s.start();
    play_for(&mut s, &clock, 15.0);
    s.stop();
    assert_eq!(s.play_state(), PlayState::Stopped);
    play_for(&mut s, &clock, 10.0);

    assert!(s.is_idle());
    let notes = recorder.notes();
    let releases = recorder.releases();
    assert!(!notes.is_empty());
    assert_eq!(notes.len(), releases.len());
    for release in &releases {
        assert!(notes
            .iter()
            .any(|n| n.performer_id == release.performer_id && n.pitch == release.pitch));
    }
}

#[test]
fn reset_cancels_pending_releases() {
    let (mut s, clock, recorder) = pipeline(6, Humanization::default());
    s.start();
    play_for(&mut s, &clock, 3.0);
    s.reset();
    assert_eq!(s.pending_releases(), 0);
    assert_eq!(recorder.events().last(), Some(&SinkEvent::SilenceAll));

    recorder.clear();
    play_for(&mut s, &clock, 5.0);
    assert!(recorder.is_empty(), "stopped scheduler still emitted");
}

// =============================================================================
// Routing and pulse
// =============================================================================

#[test]
fn router_splits_performers_by_instrument() {
    let synth = Recorder::new();
    let piano = Recorder::new();
    let marimba = Recorder::new();
    let pulse = Recorder::new();
    let mut router = NoteRouter::new().with_fallback(Box::new(pulse.clone()));
    router.add_route(InstrumentKey::Synth, Box::new(synth.clone()));
    router.add_route(InstrumentKey::Piano, Box::new(piano.clone()));
    router.add_route(InstrumentKey::Marimba, Box::new(marimba.clone()));

    let config = EnsembleConfig {
        seed: Some(31),
        pulse: true,
        ..EnsembleConfig::default()
    };
    let clock = ManualClock::new();
    let mut session = Session::new(&config, clock.clone(), Box::new(router));
    session.start();
    for _ in 0..400 {
        session.poll();
        clock.advance(STEP);
    }

    for (recorder, key) in [
        (&synth, InstrumentKey::Synth),
        (&piano, InstrumentKey::Piano),
        (&marimba, InstrumentKey::Marimba),
    ] {
        let notes = recorder.notes();
        assert!(!notes.is_empty(), "{} got nothing", key.name());
        assert!(notes.iter().all(|n| n.instrument == key));
    }
    assert!(pulse.notes().is_empty());
    let pulses = pulse
        .events()
        .iter()
        .filter(|e| matches!(e, SinkEvent::Pulse { .. }))
        .count() as u64;
    assert_eq!(pulses, session.scheduler().beats_scheduled());
}

// =============================================================================
// Completion
// =============================================================================

#[test]
fn short_score_runs_to_completion_and_stops() {
    let score = vec![
        Pattern::new(1, vec![Note::new(60, 1), Note::new(64, 1)]),
        Pattern::new(2, vec![Note::new(67, 2)]),
        Pattern::new(3, vec![Note::rest(1), Note::new(72, 1)]),
    ];
    let config = EnsembleConfig {
        seed: Some(8),
        performers: 3,
        ..EnsembleConfig::default()
    };
    let recorder = Recorder::new();
    let session = Session::with_patterns(&config, score, ManualClock::new(), Box::new(recorder.clone()));
    let mut scheduler = session.into_scheduler();
    let beats = scheduler.run_virtual(100_000);

    assert!(beats < 100_000, "never completed");
    assert!(scheduler.ensemble().is_complete());
    assert!(scheduler.state().ensemble_complete);
    assert!(scheduler.is_idle());
    assert_eq!(recorder.notes().len(), recorder.releases().len());
}

#[test]
fn virtual_render_respects_beat_limit() {
    let config = EnsembleConfig {
        seed: Some(13),
        ..EnsembleConfig::default()
    };
    let session = Session::new(&config, ManualClock::new(), Box::new(Recorder::new()));
    let mut scheduler = session.into_scheduler();
    let beats = scheduler.run_virtual(500);
    assert!((500..=502).contains(&beats), "{beats}");
    assert_eq!(scheduler.pending_releases(), 0);
}
