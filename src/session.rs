//! Session facade: config in, running scheduler out.
//!
//! The session is where outside input is resolved once. The config is
//! clamped, an absent seed is taken from the wall clock, and performer-count
//! limits are checked before the ensemble is touched.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{EnsembleConfig, MAX_PERFORMERS, MIN_PERFORMERS};
use crate::ensemble::Ensemble;
use crate::performer::PerformerId;
use crate::rng::SeededRng;
use crate::scheduler::{AudioClock, EngineState, NoteSink, Scheduler, StateCallback};
use crate::score::{in_c, Pattern};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("performer count must stay within {min}..={max}")]
    PerformerLimit { min: usize, max: usize },
    #[error("no performer with id {0}")]
    UnknownPerformer(PerformerId),
}

impl SessionError {
    fn limit() -> Self {
        SessionError::PerformerLimit {
            min: MIN_PERFORMERS,
            max: MAX_PERFORMERS,
        }
    }
}

/// A seed derived from the current time.
pub fn seed_from_wall_clock() -> u32 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (elapsed.as_secs() as u32) ^ elapsed.subsec_nanos()
}

/// One performance: a configured ensemble driven by a scheduler.
pub struct Session<C: AudioClock> {
    config: EnsembleConfig,
    seed: u32,
    scheduler: Scheduler<C>,
}

impl<C: AudioClock> Session<C> {
    /// Build a session over the bundled "In C" score.
    pub fn new(config: &EnsembleConfig, clock: C, sink: Box<dyn NoteSink>) -> Self {
        Self::with_patterns(config, in_c::patterns(), clock, sink)
    }

    /// Build a session over any score.
    pub fn with_patterns(
        config: &EnsembleConfig,
        patterns: impl Into<Arc<[Pattern]>>,
        clock: C,
        sink: Box<dyn NoteSink>,
    ) -> Self {
        let config = config.clamped();
        let seed = config.seed.unwrap_or_else(seed_from_wall_clock);
        log::info!(
            "session: {} performers, {} bpm, seed {}",
            config.performers,
            config.bpm,
            seed
        );

        let ensemble = Ensemble::new(config.performers, patterns, SeededRng::new(seed))
            .with_humanization(config.humanization)
            .with_advance_weight(config.advance_weight);
        let scheduler =
            Scheduler::new(ensemble, clock, sink, config.bpm).with_pulse(config.pulse);

        Self {
            config,
            seed,
            scheduler,
        }
    }

    /// The seed actually in use, whether configured or derived.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The clamped config this session runs with.
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<C> {
        &mut self.scheduler
    }

    pub fn into_scheduler(self) -> Scheduler<C> {
        self.scheduler
    }

    pub fn ensemble(&self) -> &Ensemble {
        self.scheduler.ensemble()
    }

    pub fn set_on_state_change(&mut self, callback: StateCallback) {
        self.scheduler.set_on_state_change(callback);
    }

    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.scheduler.set_bpm(bpm);
    }

    pub fn toggle_pulse(&mut self) -> bool {
        self.scheduler.toggle_pulse()
    }

    pub fn poll(&mut self) -> usize {
        self.scheduler.poll()
    }

    pub fn state(&self) -> EngineState {
        self.scheduler.state()
    }

    /// Add a performer, unless the ensemble is already at the maximum.
    pub fn add_performer(&mut self) -> Result<PerformerId, SessionError> {
        if self.scheduler.ensemble().active_agent_count() >= MAX_PERFORMERS {
            return Err(SessionError::limit());
        }
        let id = self.scheduler.ensemble_mut().add_agent();
        self.scheduler.notify_state_change();
        Ok(id)
    }

    /// Remove a performer, unless that would leave fewer than the minimum.
    pub fn remove_performer(&mut self, id: PerformerId) -> Result<(), SessionError> {
        let ensemble = self.scheduler.ensemble();
        match ensemble.agent(id) {
            None => return Err(SessionError::UnknownPerformer(id)),
            Some(agent) if agent.is_complete() => {}
            Some(_) if ensemble.active_agent_count() <= MIN_PERFORMERS => {
                return Err(SessionError::limit());
            }
            Some(_) => {}
        }
        self.scheduler.ensemble_mut().remove_agent(id);
        self.scheduler.notify_state_change();
        Ok(())
    }
}
