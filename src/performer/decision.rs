//! Pattern-boundary decisions: weighting, then band enforcement.
//!
//! At the end of its planned repetitions a performer weighs three options
//! (advance, repeat, drop out) against the ensemble snapshot and its own
//! personality, samples one, and then lets [`enforce_band`] override the
//! sample when the performer has strayed too far from the pack.

use super::personality::AgentPersonality;
use super::state::AgentState;
use crate::ensemble::EnsembleSnapshot;

/// Default probability mass given to advancing.
pub const DEFAULT_ADVANCE_WEIGHT: f64 = 0.3;

/// Remaining mass is split between repeat and dropout in this ratio.
const REPEAT_SHARE: f64 = 5.0 / 7.0;
const DROPOUT_SHARE: f64 = 2.0 / 7.0;

const HIGH_DENSITY: f64 = 0.8;
const LOW_DENSITY: f64 = 0.4;

/// What a performer does at a pattern boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Advance,
    Repeat,
    Dropout,
}

impl Decision {
    pub const ALL: [Decision; 3] = [Decision::Advance, Decision::Repeat, Decision::Dropout];
}

/// Normalized decision probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionWeights {
    pub advance: f64,
    pub repeat: f64,
    pub dropout: f64,
}

impl DecisionWeights {
    /// Weights in [`Decision::ALL`] order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.advance, self.repeat, self.dropout]
    }
}

/// Result of band enforcement: the final decision plus an optional jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enforced {
    pub decision: Decision,
    pub jump_to: Option<usize>,
}

impl Enforced {
    fn keep(decision: Decision) -> Self {
        Self {
            decision,
            jump_to: None,
        }
    }
}

/// Allowed spread of pattern indices for a score of `total_patterns`.
///
/// `round(total × 0.06)` clamped to `2..=5`.
pub fn band_width(total_patterns: usize) -> usize {
    ((total_patterns as f64 * 0.06).round() as usize).clamp(2, 5)
}

/// Weigh advance/repeat/dropout for `state` against `snapshot`.
pub fn compute_weights(
    state: &AgentState,
    personality: &AgentPersonality,
    snapshot: &EnsembleSnapshot,
    advance_weight: f64,
) -> DecisionWeights {
    let base = advance_weight.clamp(0.0, 1.0);
    let mut advance = base;
    let mut repeat = (1.0 - base) * REPEAT_SHARE;
    let mut dropout = (1.0 - base) * DROPOUT_SHARE;

    let index = state.pattern_index;
    let playing = snapshot.playing_count();

    // near the top of the band
    if playing > 1 && index + 1 >= snapshot.max_pattern_index() {
        advance *= 0.2;
        repeat *= 2.0;
    }
    // near the bottom
    if playing > 1 && index <= snapshot.min_pattern_index() + 1 {
        advance *= 3.0;
        repeat *= 0.3;
    }

    if snapshot.density() > HIGH_DENSITY {
        dropout *= 2.0;
    }
    if snapshot.density() < LOW_DENSITY {
        dropout *= 0.3;
    }

    // unison seeking
    let peers = || snapshot.playing().filter(|p| p.id != state.id);
    if peers().filter(|p| p.pattern_index == index).count() >= 2 {
        repeat *= 2.0;
    }
    if peers().filter(|p| p.pattern_index == index + 1).count() >= 2 {
        advance *= 2.0;
    }

    advance *= personality.advance_bias;
    repeat *= personality.repeat_bias;
    dropout *= personality.dropout_bias;

    let total = advance + repeat + dropout;
    if total <= 0.0 {
        return DecisionWeights {
            advance,
            repeat,
            dropout,
        };
    }
    DecisionWeights {
        advance: advance / total,
        repeat: repeat / total,
        dropout: dropout / total,
    }
}

/// Hard-override a sampled decision to keep the ensemble within the band.
///
/// A performer `band` or more patterns ahead of the lowest playing
/// performer may not advance. A performer `band` or more behind the highest
/// jumps to one below the highest, whatever it sampled.
pub fn enforce_band(
    state: &AgentState,
    decision: Decision,
    snapshot: &EnsembleSnapshot,
    band: usize,
) -> Enforced {
    if snapshot.playing_count() <= 1 {
        return Enforced::keep(decision);
    }

    let index = state.pattern_index;
    if decision == Decision::Advance && index >= snapshot.min_pattern_index() + band {
        return Enforced::keep(Decision::Repeat);
    }

    if index + band <= snapshot.max_pattern_index() {
        let target = snapshot.max_pattern_index().saturating_sub(1).max(index);
        return Enforced {
            decision: Decision::Advance,
            jump_to: Some(target),
        };
    }

    Enforced::keep(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::PerformerView;
    use crate::performer::state::{PerformerId, Status};

    fn view(id: u32, pattern_index: usize, status: Status) -> PerformerView {
        PerformerView {
            id: PerformerId(id),
            pattern_index,
            status,
        }
    }

    fn state_at(index: usize) -> AgentState {
        let mut s = AgentState::new(PerformerId(0), 2);
        s.pattern_index = index;
        s
    }

    #[test]
    fn band_width_scales_with_score() {
        assert_eq!(band_width(53), 3);
        assert_eq!(band_width(10), 2);
        assert_eq!(band_width(0), 2);
        assert_eq!(band_width(200), 5);
    }

    #[test]
    fn weights_are_normalized() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 6, Status::Playing),
            view(2, 4, Status::Playing),
        ]);
        let w = compute_weights(&state_at(5), &AgentPersonality::neutral(), &snapshot, 0.3);
        let sum = w.advance + w.repeat + w.dropout;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lone_performer_uses_base_split() {
        let snapshot = EnsembleSnapshot::from_views(vec![view(0, 0, Status::Playing)]);
        let w = compute_weights(&state_at(0), &AgentPersonality::neutral(), &snapshot, 0.3);
        // density 1.0 doubles dropout: 0.3 / 0.5 / 0.4
        assert!((w.advance - 0.25).abs() < 1e-9);
        assert!((w.repeat - 0.5 / 1.2).abs() < 1e-9);
        assert!((w.dropout - 0.4 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn top_of_band_prefers_repeat() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 10, Status::Playing),
            view(1, 7, Status::Playing),
            view(2, 8, Status::Playing),
        ]);
        let w = compute_weights(&state_at(10), &AgentPersonality::neutral(), &snapshot, 0.3);
        assert!(w.repeat > w.advance * 5.0);
    }

    #[test]
    fn bottom_of_band_prefers_advance() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 7, Status::Playing),
            view(1, 9, Status::Playing),
            view(2, 10, Status::Playing),
        ]);
        let w = compute_weights(&state_at(7), &AgentPersonality::neutral(), &snapshot, 0.3);
        assert!(w.advance > w.repeat);
    }

    #[test]
    fn low_density_suppresses_dropout() {
        let crowded = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 5, Status::Playing),
        ]);
        let sparse = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 5, Status::Silent),
            view(2, 5, Status::Silent),
            view(3, 5, Status::Silent),
        ]);
        let p = AgentPersonality::neutral();
        let a = compute_weights(&state_at(5), &p, &crowded, 0.3);
        let b = compute_weights(&state_at(5), &p, &sparse, 0.3);
        assert!(a.dropout > b.dropout);
    }

    #[test]
    fn unison_boosts_repeat() {
        let together = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 5, Status::Playing),
            view(2, 5, Status::Playing),
            view(3, 3, Status::Playing),
            view(4, 7, Status::Playing),
        ]);
        let apart = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 4, Status::Playing),
            view(2, 6, Status::Playing),
            view(3, 3, Status::Playing),
            view(4, 7, Status::Playing),
        ]);
        let p = AgentPersonality::neutral();
        let a = compute_weights(&state_at(5), &p, &together, 0.3);
        let b = compute_weights(&state_at(5), &p, &apart, 0.3);
        assert!(a.repeat > b.repeat);
    }

    #[test]
    fn higher_advance_weight_advances_more() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 4, Status::Playing),
            view(2, 6, Status::Playing),
        ]);
        let p = AgentPersonality::neutral();
        let low = compute_weights(&state_at(5), &p, &snapshot, 0.1);
        let high = compute_weights(&state_at(5), &p, &snapshot, 0.6);
        assert!(high.advance > low.advance);
    }

    #[test]
    fn far_ahead_cannot_advance() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 10, Status::Playing),
            view(1, 7, Status::Playing),
            view(2, 7, Status::Playing),
        ]);
        let result = enforce_band(&state_at(10), Decision::Advance, &snapshot, 3);
        assert_eq!(result.decision, Decision::Repeat);
        assert_eq!(result.jump_to, None);
    }

    #[test]
    fn far_behind_jumps_forward() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 3, Status::Playing),
            view(1, 8, Status::Playing),
            view(2, 7, Status::Playing),
        ]);
        for sampled in Decision::ALL {
            let result = enforce_band(&state_at(3), sampled, &snapshot, 3);
            assert_eq!(result.decision, Decision::Advance);
            assert_eq!(result.jump_to, Some(7));
        }
    }

    #[test]
    fn within_band_is_untouched() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 5, Status::Playing),
            view(1, 6, Status::Playing),
            view(2, 4, Status::Playing),
        ]);
        for sampled in Decision::ALL {
            let result = enforce_band(&state_at(5), sampled, &snapshot, 3);
            assert_eq!(result, Enforced::keep(sampled));
        }
    }

    #[test]
    fn single_player_is_never_enforced() {
        let snapshot = EnsembleSnapshot::from_views(vec![
            view(0, 20, Status::Playing),
            view(1, 0, Status::Silent),
        ]);
        let result = enforce_band(&state_at(20), Decision::Advance, &snapshot, 3);
        assert_eq!(result.decision, Decision::Advance);
    }
}
