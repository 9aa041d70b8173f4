//! Read-only projection of performer state for display collaborators.

use serde::Serialize;

use crate::performer::{PerformerId, Status};

/// Which voice family a performer is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKey {
    Synth,
    Piano,
    Marimba,
}

impl InstrumentKey {
    pub const ALL: [InstrumentKey; 3] = [Self::Synth, Self::Piano, Self::Marimba];

    /// Round-robin assignment by id.
    pub fn for_performer(id: PerformerId) -> Self {
        Self::ALL[id.0 as usize % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Synth => "synth",
            Self::Piano => "piano",
            Self::Marimba => "marimba",
        }
    }
}

/// What a UI needs to draw one performer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformerState {
    pub id: PerformerId,
    pub pattern_index: usize,
    /// 1-based pattern number.
    pub display_pattern: usize,
    pub status: Status,
    pub current_rep: u32,
    pub total_reps: u32,
    pub instrument: InstrumentKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_cycle() {
        let keys: Vec<_> = (0..6).map(|i| InstrumentKey::for_performer(PerformerId(i))).collect();
        assert_eq!(
            keys,
            vec![
                InstrumentKey::Synth,
                InstrumentKey::Piano,
                InstrumentKey::Marimba,
                InstrumentKey::Synth,
                InstrumentKey::Piano,
                InstrumentKey::Marimba,
            ]
        );
    }
}
