//! Performer agents — one state machine per player.
//!
//! Each agent walks the shared score in order. Once per tick it either waits
//! (entry delay, sustain, silence), or sounds its next note. At the end of its
//! planned repetitions it decides whether to advance, repeat, or rest, using
//! the ensemble snapshot taken before anyone moved this tick.

pub mod decision;
pub mod personality;
pub mod state;

pub use decision::{band_width, compute_weights, enforce_band, Decision, DecisionWeights, Enforced};
pub use personality::AgentPersonality;
pub use state::{AgentState, PerformerId, Status};

use std::sync::Arc;

use crate::ensemble::EnsembleSnapshot;
use crate::event::AgentNoteEvent;
use crate::humanize::{
    compute_timing_offset, compute_velocity, Humanization, TimingContext, VelocityContext,
};
use crate::rng::SeededRng;
use crate::score::{Pattern, Pitch};

/// Repetition counts are drawn uniformly from this inclusive range.
pub const MIN_REPETITIONS: i64 = 2;
pub const MAX_REPETITIONS: i64 = 8;

/// Fraction of the ensemble at the final pattern above which retirement begins.
const ENDGAME_THRESHOLD: f64 = 0.6;

/// Shared inputs for one ensemble tick.
///
/// Built once per tick by the coordinator and handed to every agent in turn.
pub struct TickContext<'a> {
    pub snapshot: &'a EnsembleSnapshot,
    pub rng: &'a mut SeededRng,
    pub bpm: f64,
    pub humanization: Humanization,
    pub advance_weight: f64,
    /// Dropouts still grantable this tick without falling under two players.
    pub dropout_allowance: usize,
}

impl TickContext<'_> {
    fn seconds_per_eighth(&self) -> f64 {
        60.0 / (self.bpm.max(1.0) * 2.0)
    }
}

/// One performer: fixed personality plus evolving state over a shared score.
#[derive(Debug, Clone)]
pub struct PerformerAgent {
    state: AgentState,
    personality: AgentPersonality,
    patterns: Arc<[Pattern]>,
}

fn draw_repetitions(rng: &mut SeededRng) -> u32 {
    rng.int_range(MIN_REPETITIONS, MAX_REPETITIONS) as u32
}

impl PerformerAgent {
    /// Create an agent, drawing its personality and first repetition count.
    pub fn new(id: PerformerId, patterns: Arc<[Pattern]>, rng: &mut SeededRng) -> Self {
        let personality = AgentPersonality::generate(rng);
        let reps = draw_repetitions(rng);
        Self {
            state: AgentState::new(id, reps),
            personality,
            patterns,
        }
    }

    /// Replace the personality. Intended for tests and tuning tools.
    pub fn with_personality(mut self, personality: AgentPersonality) -> Self {
        self.personality = personality;
        self
    }

    pub fn id(&self) -> PerformerId {
        self.state.id
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn personality(&self) -> &AgentPersonality {
        &self.personality
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_complete(&self) -> bool {
        self.state.status == Status::Complete
    }

    fn final_index(&self) -> usize {
        self.patterns.len().saturating_sub(1)
    }

    fn band(&self) -> usize {
        band_width(self.patterns.len())
    }

    /// Clear all counters and return to the first pattern. The personality is kept.
    pub fn reset(&mut self, rng: &mut SeededRng) {
        let reps = draw_repetitions(rng);
        self.state = AgentState::new(self.state.id, reps);
    }

    /// Advance one beat. Returns a note event when a pitched note starts.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> Option<AgentNoteEvent> {
        let beat_index = self.state.tick_count;
        self.state.tick_count += 1;

        if self.state.entry_delay > 0 {
            self.state.entry_delay -= 1;
            return None;
        }

        match self.state.status {
            Status::Complete => return None,
            Status::Silent => {
                self.evaluate_rejoin(ctx);
                return None;
            }
            Status::Playing => {}
        }

        self.state.beats_since_last_dropout = self.state.beats_since_last_dropout.saturating_add(1);

        if self.state.beats_in_current_note > 0 {
            self.state.beats_in_current_note -= 1;
            return None;
        }

        let patterns = Arc::clone(&self.patterns);
        let Some(pattern) = patterns.get(self.state.pattern_index) else {
            log::debug!("{} ran past the last pattern", self.state.id);
            self.state.status = Status::Complete;
            return None;
        };

        let note_index = self.state.note_index;
        let note = match pattern.note(note_index) {
            Some(note) => *note,
            None if pattern.is_empty() => {
                // nothing to play; treat as a finished pass
                self.finish_pass(ctx);
                return None;
            }
            None => {
                self.state.note_index = 0;
                return None;
            }
        };

        self.state.beats_in_current_note = note.duration.saturating_sub(1);
        let current_rep = self.state.current_repetition();
        let total_reps = self.state.total_repetitions;

        self.state.note_index += 1;
        if self.state.note_index >= pattern.len() {
            self.finish_pass(ctx);
        }

        let Pitch::Midi(pitch) = note.pitch else {
            return None;
        };

        let velocity = compute_velocity(
            &VelocityContext {
                note_index_in_pattern: note_index,
                total_notes_in_pattern: pattern.len(),
                current_rep,
                total_reps,
                personality: &self.personality.velocity,
                config: ctx.humanization.velocity,
            },
            ctx.rng,
        );
        let timing_offset = compute_timing_offset(
            &TimingContext {
                beat_index,
                note_index_in_pattern: note_index,
                personality: &self.personality.timing,
                density: ctx.snapshot.density(),
                config: ctx.humanization.timing,
                seconds_per_eighth: ctx.seconds_per_eighth(),
            },
            ctx.rng,
        );

        Some(AgentNoteEvent {
            performer_id: self.state.id,
            pitch,
            duration: note.duration,
            velocity,
            timing_offset,
        })
    }

    /// Wrap the note index and count down a repetition.
    fn finish_pass(&mut self, ctx: &mut TickContext<'_>) {
        self.state.note_index = 0;
        self.state.repetitions_remaining = self.state.repetitions_remaining.saturating_sub(1);
        if self.state.repetitions_remaining == 0 {
            self.decide(ctx);
        }
    }

    fn redraw_repetitions(&mut self, rng: &mut SeededRng) {
        let reps = draw_repetitions(rng);
        self.state.repetitions_remaining = reps;
        self.state.total_repetitions = reps;
    }

    fn decide(&mut self, ctx: &mut TickContext<'_>) {
        if self.state.pattern_index >= self.final_index() {
            self.endgame(ctx);
            return;
        }

        let weights = compute_weights(
            &self.state,
            &self.personality,
            ctx.snapshot,
            ctx.advance_weight,
        );
        let sampled = ctx
            .rng
            .weighted_pick(&Decision::ALL, &weights.as_array())
            .copied()
            .unwrap_or(Decision::Repeat);
        let enforced = enforce_band(&self.state, sampled, ctx.snapshot, self.band());

        match enforced.decision {
            Decision::Advance => {
                let next = enforced
                    .jump_to
                    .unwrap_or(self.state.pattern_index + 1);
                log::debug!(
                    "{} advances {} -> {}",
                    self.state.id,
                    self.state.pattern_index,
                    next
                );
                self.state.pattern_index = next;
                self.state.note_index = 0;
                self.redraw_repetitions(ctx.rng);
            }
            Decision::Repeat => self.redraw_repetitions(ctx.rng),
            Decision::Dropout => {
                let cooled =
                    self.state.beats_since_last_dropout >= self.personality.dropout_cooldown;
                if cooled && ctx.dropout_allowance > 0 {
                    log::debug!("{} drops out at pattern {}", self.state.id, self.state.pattern_index);
                    ctx.dropout_allowance -= 1;
                    self.state.status = Status::Silent;
                    self.state.beats_silent = 0;
                    self.state.beats_since_last_dropout = 0;
                } else {
                    self.redraw_repetitions(ctx.rng);
                }
            }
        }
    }

    fn endgame(&mut self, ctx: &mut TickContext<'_>) {
        let final_index = self.final_index();
        let total = ctx.snapshot.total_performers();
        if total > 0 {
            let at_end = ctx
                .snapshot
                .performers()
                .iter()
                .filter(|p| p.pattern_index >= final_index)
                .count();
            let fraction = at_end as f64 / total as f64;
            if fraction > ENDGAME_THRESHOLD {
                let chance = (fraction - ENDGAME_THRESHOLD) * 2.5 * 0.1;
                if ctx.rng.next_f64() < chance {
                    log::debug!("{} retires", self.state.id);
                    self.state.status = Status::Complete;
                    return;
                }
            }
        }
        self.redraw_repetitions(ctx.rng);
    }

    fn evaluate_rejoin(&mut self, ctx: &mut TickContext<'_>) {
        self.state.beats_silent = self.state.beats_silent.saturating_add(1);
        let silent = self.state.beats_silent;
        let min = self.personality.min_silent_beats;
        let max = self.personality.max_silent_beats;

        if silent >= max {
            self.rejoin(ctx);
            return;
        }
        if silent < min {
            return;
        }

        let span = max.saturating_sub(min).max(1) as f64;
        let mut probability = (silent - min) as f64 / span * 0.3;
        let density = ctx.snapshot.density();
        if density < 0.5 {
            probability += (0.5 - density) * 0.4;
        }
        if ctx.rng.next_f64() < probability {
            self.rejoin(ctx);
        }
    }

    fn rejoin(&mut self, ctx: &mut TickContext<'_>) {
        self.state.status = Status::Playing;
        self.state.beats_silent = 0;
        self.state.beats_in_current_note = 0;
        self.state.note_index = 0;

        let band = self.band();
        let anyone_playing = ctx.snapshot.playing_count() > 0;
        // stepping forward may not land a band width above the slowest player
        let too_far_ahead =
            anyone_playing && self.state.pattern_index + 1 >= ctx.snapshot.min_pattern_index() + band;
        if self.state.pattern_index < self.final_index() && !too_far_ahead {
            self.state.pattern_index += 1;
        }
        self.redraw_repetitions(ctx.rng);

        let max = ctx.snapshot.max_pattern_index();
        if anyone_playing && max > self.state.pattern_index + band {
            self.state.pattern_index = max - 1;
        }
        log::debug!("{} rejoins at pattern {}", self.state.id, self.state.pattern_index);
    }
}
