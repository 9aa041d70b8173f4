//! Per-performer traits, drawn once when a performer is created.

use crate::humanize::{TimingPersonality, VelocityPersonality};
use crate::rng::SeededRng;

/// Fixed traits of one performer. Never changes after creation; a reset
/// only clears counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPersonality {
    pub advance_bias: f64,
    pub repeat_bias: f64,
    pub dropout_bias: f64,
    /// Shortest rest before a rejoin is considered, in beats.
    pub min_silent_beats: u32,
    /// Rest length at which a rejoin is forced, in beats.
    pub max_silent_beats: u32,
    /// Beats that must pass after a dropout before the next one.
    pub dropout_cooldown: u32,
    pub velocity: VelocityPersonality,
    pub timing: TimingPersonality,
}

impl AgentPersonality {
    /// Draw a personality. Consumes ten values from `rng`, in field order.
    pub fn generate(rng: &mut SeededRng) -> Self {
        let advance_bias = rng.range_f64(0.8, 1.2);
        let repeat_bias = rng.range_f64(0.8, 1.2);
        let dropout_bias = rng.range_f64(0.8, 1.2);
        let min_silent_beats = rng.range_f64(4.0, 16.0).floor() as u32;
        let max_silent_beats = rng.range_f64(16.0, 64.0).floor() as u32;
        let dropout_cooldown = rng.range_f64(16.0, 48.0).floor() as u32;
        let velocity = VelocityPersonality::generate(rng);
        let timing = TimingPersonality::generate(rng);
        Self {
            advance_bias,
            repeat_bias,
            dropout_bias,
            min_silent_beats,
            max_silent_beats,
            dropout_cooldown,
            velocity,
            timing,
        }
    }

    /// A personality with all biases at 1.0 and mid-range traits.
    pub fn neutral() -> Self {
        Self {
            advance_bias: 1.0,
            repeat_bias: 1.0,
            dropout_bias: 1.0,
            min_silent_beats: 8,
            max_silent_beats: 32,
            dropout_cooldown: 16,
            velocity: VelocityPersonality {
                base_loudness: 0.85,
                jitter_amount: 0.05,
            },
            timing: TimingPersonality {
                rush_drag_bias: 0.0,
                timing_jitter: 0.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ranges() {
        let mut rng = SeededRng::new(17);
        for _ in 0..500 {
            let p = AgentPersonality::generate(&mut rng);
            for bias in [p.advance_bias, p.repeat_bias, p.dropout_bias] {
                assert!((0.8..1.2).contains(&bias));
            }
            assert!((4..16).contains(&p.min_silent_beats));
            assert!((16..64).contains(&p.max_silent_beats));
            assert!((16..48).contains(&p.dropout_cooldown));
            assert!(p.min_silent_beats < p.max_silent_beats);
        }
    }

    #[test]
    fn same_seed_same_personality() {
        let a = AgentPersonality::generate(&mut SeededRng::new(3));
        let b = AgentPersonality::generate(&mut SeededRng::new(3));
        assert_eq!(a, b);
    }

    #[test]
    fn consumes_ten_draws() {
        let mut a = SeededRng::new(8);
        let mut b = SeededRng::new(8);
        AgentPersonality::generate(&mut a);
        for _ in 0..10 {
            b.next_f64();
        }
        assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
    }
}
