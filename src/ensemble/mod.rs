//! Ensemble coordinator — owns the agents and the shared random source.
//!
//! A tick is strictly two-phase. First, removals queued since the last tick
//! are swept and a single [`EnsembleSnapshot`] is frozen. Then every agent
//! ticks, in creation order, against that same snapshot. Agent order is part
//! of the reproducibility contract: every agent draws from the one shared
//! [`SeededRng`], so reordering them changes everything downstream.

pub mod snapshot;
pub mod view;

pub use snapshot::{EnsembleSnapshot, PerformerView};
pub use view::{InstrumentKey, PerformerState};

use std::sync::Arc;

use crate::event::AgentNoteEvent;
use crate::humanize::{advance_rubato, compute_rubato_multiplier, Humanization, RubatoState};
use crate::performer::decision::DEFAULT_ADVANCE_WEIGHT;
use crate::performer::{band_width, PerformerAgent, PerformerId, Status, TickContext};
use crate::rng::SeededRng;
use crate::score::Pattern;

/// Fewest performers left playing after any dropout.
pub const MIN_ACTIVE_PERFORMERS: usize = 2;

/// Entry stagger between consecutive performers, in beats (inclusive).
const ENTRY_STAGGER: (i64, i64) = (2, 4);

fn draw_stagger(rng: &mut SeededRng) -> u32 {
    rng.int_range(ENTRY_STAGGER.0, ENTRY_STAGGER.1) as u32
}

/// The set of performers sharing one score and one random source.
#[derive(Debug, Clone)]
pub struct Ensemble {
    agents: Vec<PerformerAgent>,
    pending_removals: Vec<PerformerId>,
    patterns: Arc<[Pattern]>,
    rng: SeededRng,
    next_id: u32,
    rubato: RubatoState,
    tempo_multiplier: f64,
    humanization: Humanization,
    advance_weight: f64,
    beat: u64,
}

impl Ensemble {
    /// Create `count` performers over `patterns`.
    ///
    /// Randomness is consumed in a fixed order: each agent's personality and
    /// first repetition count, then its entry stagger, agent by agent; then
    /// the rubato period.
    pub fn new(count: usize, patterns: impl Into<Arc<[Pattern]>>, mut rng: SeededRng) -> Self {
        let patterns = patterns.into();
        let mut agents = Vec::with_capacity(count);
        let mut delay = 0u32;
        for i in 0..count {
            let mut agent = PerformerAgent::new(PerformerId(i as u32), Arc::clone(&patterns), &mut rng);
            if i > 0 {
                delay += draw_stagger(&mut rng);
            }
            agent.state_mut().entry_delay = delay;
            agents.push(agent);
        }
        let rubato = RubatoState::generate(&mut rng);
        log::debug!(
            "ensemble of {} over {} patterns, rubato period {}",
            count,
            patterns.len(),
            rubato.period
        );

        Self {
            agents,
            pending_removals: Vec::new(),
            patterns,
            rng,
            next_id: count as u32,
            rubato,
            tempo_multiplier: 1.0,
            humanization: Humanization::default(),
            advance_weight: DEFAULT_ADVANCE_WEIGHT,
            beat: 0,
        }
    }

    pub fn with_humanization(mut self, humanization: Humanization) -> Self {
        self.humanization = humanization;
        self
    }

    pub fn with_advance_weight(mut self, weight: f64) -> Self {
        self.advance_weight = weight;
        self
    }

    fn sweep_removals(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_removals);
        self.agents.retain(|a| !pending.contains(&a.id()));
        log::debug!("removed {} performer(s)", pending.len());
    }

    /// Freeze the current positions of every agent.
    pub fn snapshot(&self) -> EnsembleSnapshot {
        EnsembleSnapshot::from_views(
            self.agents
                .iter()
                .map(|a| PerformerView {
                    id: a.id(),
                    pattern_index: a.state().pattern_index,
                    status: a.state().status,
                })
                .collect(),
        )
    }

    /// Advance every performer one beat at `bpm`. Returns note events in agent order.
    pub fn tick(&mut self, bpm: f64) -> Vec<AgentNoteEvent> {
        self.sweep_removals();
        let snapshot = self.snapshot();

        let mut ctx = TickContext {
            snapshot: &snapshot,
            rng: &mut self.rng,
            bpm,
            humanization: self.humanization,
            advance_weight: self.advance_weight,
            dropout_allowance: snapshot.playing_count().saturating_sub(MIN_ACTIVE_PERFORMERS),
        };
        let events: Vec<AgentNoteEvent> = self
            .agents
            .iter_mut()
            .filter_map(|agent| agent.tick(&mut ctx))
            .collect();

        self.rubato = advance_rubato(&self.rubato);
        self.tempo_multiplier = if self.humanization.timing.enabled {
            compute_rubato_multiplier(&self.rubato, self.humanization.timing.effective_scale())
        } else {
            1.0
        };
        self.beat += 1;
        events
    }

    /// Add a performer at the current lowest playing pattern. Returns its id.
    pub fn add_agent(&mut self) -> PerformerId {
        let id = PerformerId(self.next_id);
        self.next_id += 1;

        let start = self.snapshot().min_pattern_index();
        let mut agent = PerformerAgent::new(id, Arc::clone(&self.patterns), &mut self.rng);
        let delay = draw_stagger(&mut self.rng);
        let state = agent.state_mut();
        state.pattern_index = start;
        state.note_index = 0;
        state.entry_delay = delay;
        state.tick_count = self.beat;

        log::info!("{} joins at pattern {}", id, start + 1);
        self.agents.push(agent);
        id
    }

    /// Silence a performer now and drop it at the start of the next tick.
    ///
    /// Returns `false` if no such performer exists.
    pub fn remove_agent(&mut self, id: PerformerId) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        agent.state_mut().status = Status::Complete;
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
        log::info!("{} leaves", id);
        true
    }

    /// True once every performer has retired.
    pub fn is_complete(&self) -> bool {
        self.agents.iter().all(PerformerAgent::is_complete)
    }

    /// Display projection of every performer, in tick order.
    pub fn performer_states(&self) -> Vec<PerformerState> {
        self.agents
            .iter()
            .map(|a| {
                let s = a.state();
                PerformerState {
                    id: s.id,
                    pattern_index: s.pattern_index,
                    display_pattern: (s.pattern_index + 1).min(self.patterns.len()),
                    status: s.status,
                    current_rep: s.current_repetition(),
                    total_reps: s.total_repetitions,
                    instrument: InstrumentKey::for_performer(s.id),
                }
            })
            .collect()
    }

    pub fn agents(&self) -> &[PerformerAgent] {
        &self.agents
    }

    pub fn agent(&self, id: PerformerId) -> Option<&PerformerAgent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn agent_mut(&mut self, id: PerformerId) -> Option<&mut PerformerAgent> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Performers not yet retired.
    pub fn active_agent_count(&self) -> usize {
        self.agents.iter().filter(|a| !a.is_complete()).count()
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Rubato multiplier computed at the end of the last tick.
    pub fn tempo_multiplier(&self) -> f64 {
        self.tempo_multiplier
    }

    pub fn rubato(&self) -> RubatoState {
        self.rubato
    }

    pub fn band_width(&self) -> usize {
        band_width(self.patterns.len())
    }

    pub fn humanization(&self) -> Humanization {
        self.humanization
    }

    /// Ticks elapsed since construction or the last reset.
    pub fn beat(&self) -> u64 {
        self.beat
    }

    /// Return every performer to the start. Personalities and ids survive;
    /// entry delays are re-staggered.
    pub fn reset(&mut self) {
        self.sweep_removals();
        let mut delay = 0u32;
        for (i, agent) in self.agents.iter_mut().enumerate() {
            agent.reset(&mut self.rng);
            if i > 0 {
                delay += draw_stagger(&mut self.rng);
            }
            agent.state_mut().entry_delay = delay;
        }
        self.rubato = RubatoState::new(self.rubato.period);
        self.tempo_multiplier = 1.0;
        self.beat = 0;
        log::info!("ensemble reset ({} performers)", self.agents.len());
    }
}
