//! Timing model — per-note offsets and slow tempo breathing (rubato).
//!
//! A note's offset is the sum of four layers:
//! swing on odd beats, the performer's rush/drag bias, per-note jitter, and
//! a looseness term proportional to ensemble density. Positive is late.
//!
//! The total is clamped to ±[`MAX_TIMING_OFFSET`], which is less than half the
//! scheduler's lookahead window.

use std::f64::consts::TAU;

use super::HumanizeConfig;
use crate::rng::SeededRng;

/// Largest offset applied to any note, in seconds.
pub const MAX_TIMING_OFFSET: f64 = 0.050;

const SWING_FRACTION: f64 = 0.15;
const PERSONALITY_RANGE: f64 = 0.040;
const JITTER_RANGE: f64 = 0.040;
const DENSITY_LOOSENESS: f64 = 0.005;
const RUBATO_DEPTH: f64 = 0.03;

/// Per-performer timing traits, fixed for the performer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingPersonality {
    /// Directional bias in `[-0.3, 0.3)`; negative rushes, positive drags.
    pub rush_drag_bias: f64,
    /// Per-note jitter scale in `[0.3, 1.0)`.
    pub timing_jitter: f64,
}

impl TimingPersonality {
    /// Draw a personality. Consumes two values from `rng`.
    pub fn generate(rng: &mut SeededRng) -> Self {
        Self {
            rush_drag_bias: (rng.next_f64() - 0.5) * 0.6,
            timing_jitter: rng.range_f64(0.3, 1.0),
        }
    }
}

/// Everything the timing model needs to know about one note.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext<'a> {
    /// Global beat counter; odd beats are offbeats.
    pub beat_index: u64,
    pub note_index_in_pattern: usize,
    pub personality: &'a TimingPersonality,
    /// Fraction of performers currently playing, `[0, 1]`.
    pub density: f64,
    pub config: HumanizeConfig,
    pub seconds_per_eighth: f64,
}

/// Shared slow oscillation applied to tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubatoState {
    /// Radians, kept in `[0, 2π)`.
    pub phase: f64,
    /// Beats per full cycle.
    pub period: f64,
}

impl RubatoState {
    pub fn new(period: f64) -> Self {
        Self {
            phase: 0.0,
            period: period.max(1.0),
        }
    }

    /// Draw a period of 16–32 beats. Consumes one value from `rng`.
    pub fn generate(rng: &mut SeededRng) -> Self {
        Self::new(rng.int_range(16, 32) as f64)
    }
}

/// Swing offset: zero on even beats, pushed late on odd beats.
pub fn compute_swing_offset(beat_index: u64, seconds_per_eighth: f64, scale: f64) -> f64 {
    if beat_index % 2 == 0 {
        0.0
    } else {
        SWING_FRACTION * scale * seconds_per_eighth
    }
}

/// Compute the timing offset of one note, in seconds.
///
/// Returns exactly 0.0 (without drawing) when disabled. Consumes one draw
/// when enabled.
pub fn compute_timing_offset(ctx: &TimingContext<'_>, rng: &mut SeededRng) -> f64 {
    if !ctx.config.enabled {
        return 0.0;
    }
    let scale = ctx.config.intensity.scale();

    let swing = compute_swing_offset(ctx.beat_index, ctx.seconds_per_eighth, scale);
    let personality = ctx.personality.rush_drag_bias * PERSONALITY_RANGE * scale;
    let jitter = (rng.next_f64() - 0.5) * 2.0 * ctx.personality.timing_jitter * JITTER_RANGE * scale;
    let looseness = ctx.density * DENSITY_LOOSENESS * scale;

    (swing + personality + jitter + looseness).clamp(-MAX_TIMING_OFFSET, MAX_TIMING_OFFSET)
}

/// Tempo multiplier for the current rubato phase: `1 ± 3% × scale`.
pub fn compute_rubato_multiplier(rubato: &RubatoState, scale: f64) -> f64 {
    1.0 + rubato.phase.sin() * RUBATO_DEPTH * scale
}

/// Advance the rubato phase by one beat. Returns a new state.
pub fn advance_rubato(rubato: &RubatoState) -> RubatoState {
    let step = TAU / rubato.period;
    let mut phase = rubato.phase + step;
    if phase >= TAU {
        phase -= TAU;
    }
    RubatoState {
        phase,
        period: rubato.period,
    }
}
