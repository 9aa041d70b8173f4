//! Velocity model — per-note loudness from four multiplicative layers.
//!
//! 1. Jitter: uniform per-note variation scaled by the performer's jitter amount.
//! 2. Personality: the performer's base loudness.
//! 3. Metric accent: the first note of each pattern pass is boosted.
//! 4. Phrase contour: a bell curve across the planned repetitions, peaking at 60%.
//!
//! Output is normalized to `[MIN_VELOCITY, MAX_VELOCITY]`; sinks scale it to
//! their own range.

use super::HumanizeConfig;
use crate::rng::SeededRng;

pub const MIN_VELOCITY: f64 = 0.3;
pub const MAX_VELOCITY: f64 = 1.0;

const ACCENT_BOOST: f64 = 0.08;
const CONTOUR_PEAK: f64 = 0.6;
const CONTOUR_WIDTH: f64 = 0.6;
const CONTOUR_DEVIATION: f64 = 0.15;

/// Per-performer dynamic traits, fixed for the performer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityPersonality {
    /// Average dynamic level, in `[0.7, 1.0)`.
    pub base_loudness: f64,
    /// Per-note random variation, in `[0.02, 0.12)`.
    pub jitter_amount: f64,
}

impl VelocityPersonality {
    /// Draw a personality. Consumes two values from `rng`.
    pub fn generate(rng: &mut SeededRng) -> Self {
        Self {
            base_loudness: rng.range_f64(0.7, 1.0),
            jitter_amount: rng.range_f64(0.02, 0.12),
        }
    }
}

/// Everything the velocity model needs to know about one note.
#[derive(Debug, Clone, Copy)]
pub struct VelocityContext<'a> {
    /// Position of the note within its pattern (0-based).
    pub note_index_in_pattern: usize,
    pub total_notes_in_pattern: usize,
    /// Current repetition, 1-based.
    pub current_rep: u32,
    pub total_reps: u32,
    pub personality: &'a VelocityPersonality,
    pub config: HumanizeConfig,
}

/// Bell-shaped multiplier across repetitions, around 1.0.
fn phrase_contour(current_rep: u32, total_reps: u32, scale: f64) -> f64 {
    if total_reps <= 1 {
        return 1.0;
    }
    let progress = (current_rep.saturating_sub(1)) as f64 / (total_reps - 1) as f64;
    let curve = 1.0 - ((progress - CONTOUR_PEAK) / CONTOUR_WIDTH).powi(2);
    1.0 + curve * CONTOUR_DEVIATION * scale
}

/// Compute the velocity of one note.
///
/// Returns exactly 1.0 (without drawing) when disabled, otherwise a value in
/// `[MIN_VELOCITY, MAX_VELOCITY]`. Consumes one draw when enabled.
pub fn compute_velocity(ctx: &VelocityContext<'_>, rng: &mut SeededRng) -> f64 {
    if !ctx.config.enabled {
        return 1.0;
    }
    let scale = ctx.config.intensity.scale();

    let jitter = 1.0 + (rng.next_f64() - 0.5) * 2.0 * ctx.personality.jitter_amount * scale;
    let personality = ctx.personality.base_loudness;
    let accent = if ctx.note_index_in_pattern == 0 {
        1.0 + ACCENT_BOOST * scale
    } else {
        1.0
    };
    let contour = phrase_contour(ctx.current_rep, ctx.total_reps, scale);

    (personality * jitter * accent * contour).clamp(MIN_VELOCITY, MAX_VELOCITY)
}
