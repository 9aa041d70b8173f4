//! Config persistence tests: YAML on disk → session.

use ostinato::config::MAX_PERFORMERS;
use ostinato::humanize::{HumanizeConfig, Humanization, Intensity};
use ostinato::osc::OscConfig;
use ostinato::performer::PerformerId;
use ostinato::scheduler::{ManualClock, Recorder};
use ostinato::{EnsembleConfig, Session, SessionError};

#[test]
fn save_and_load_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = EnsembleConfig {
        bpm: 144.0,
        performers: 9,
        seed: Some(31337),
        advance_weight: 0.45,
        humanization: Humanization {
            velocity: HumanizeConfig {
                enabled: true,
                intensity: Intensity::Expressive,
            },
            timing: HumanizeConfig::disabled(),
        },
        pulse: true,
        osc: Some(OscConfig::new("10.0.0.5:9000")),
    };
    config.save(&path).unwrap();

    let loaded = EnsembleConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn optional_fields_are_omitted_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    EnsembleConfig::default().save(&path).unwrap();

    let yaml = std::fs::read_to_string(&path).unwrap();
    assert!(!yaml.contains("seed"));
    assert!(!yaml.contains("osc"));
    assert_eq!(EnsembleConfig::load(&path).unwrap(), EnsembleConfig::default());
}

#[test]
fn hand_edited_file_is_clamped_by_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "bpm: 400\nperformers: 30\nseed: 5\nadvance_weight: 0.01\n").unwrap();

    let loaded = EnsembleConfig::load(&path).unwrap();
    assert_eq!(loaded.bpm, 400.0);

    let session = Session::new(&loaded, ManualClock::new(), Box::new(Recorder::new()));
    assert_eq!(session.config().bpm, 180.0);
    assert_eq!(session.config().performers, MAX_PERFORMERS);
    assert_eq!(session.config().advance_weight, 0.1);
    assert_eq!(session.seed(), 5);
    assert_eq!(session.ensemble().agent_count(), MAX_PERFORMERS);
}

#[test]
fn loaded_seed_reproduces_the_performance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    EnsembleConfig {
        seed: Some(2718),
        performers: 5,
        ..EnsembleConfig::default()
    }
    .save(&path)
    .unwrap();

    let render = || {
        let config = EnsembleConfig::load(&path).unwrap();
        let recorder = Recorder::new();
        let session = Session::new(&config, ManualClock::new(), Box::new(recorder.clone()));
        session.into_scheduler().run_virtual(800);
        recorder.events()
    };
    assert_eq!(render(), render());
}

#[test]
fn session_limits_hold_at_maximum() {
    let config = EnsembleConfig {
        performers: MAX_PERFORMERS,
        seed: Some(1),
        ..EnsembleConfig::default()
    };
    let mut session = Session::new(&config, ManualClock::new(), Box::new(Recorder::new()));
    assert!(matches!(
        session.add_performer(),
        Err(SessionError::PerformerLimit { .. })
    ));

    session.remove_performer(PerformerId(3)).unwrap();
    assert_eq!(session.add_performer(), Ok(PerformerId(MAX_PERFORMERS as u32)));
}
