//! Frozen per-tick view of the ensemble.

use crate::performer::{PerformerId, Status};

/// One performer's position as seen by its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformerView {
    pub id: PerformerId,
    pub pattern_index: usize,
    pub status: Status,
}

/// Immutable ensemble state captured before any agent moves in a tick.
///
/// Owns its data outright; nothing here aliases live agent state, and there
/// is no way to mutate a snapshot once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSnapshot {
    performers: Box<[PerformerView]>,
    min_pattern_index: usize,
    max_pattern_index: usize,
    average_pattern_index: f64,
    density: f64,
    total_performers: usize,
}

impl EnsembleSnapshot {
    /// Build a snapshot; the index aggregates consider `playing` performers only.
    pub fn from_views(views: Vec<PerformerView>) -> Self {
        let total = views.len();
        let mut playing = 0usize;
        let mut min = usize::MAX;
        let mut max = 0usize;
        let mut sum = 0usize;
        for view in views.iter().filter(|v| v.status == Status::Playing) {
            playing += 1;
            min = min.min(view.pattern_index);
            max = max.max(view.pattern_index);
            sum += view.pattern_index;
        }
        if playing == 0 {
            min = 0;
        }

        Self {
            performers: views.into_boxed_slice(),
            min_pattern_index: min,
            max_pattern_index: max,
            average_pattern_index: if playing == 0 {
                0.0
            } else {
                sum as f64 / playing as f64
            },
            density: if total == 0 {
                0.0
            } else {
                playing as f64 / total as f64
            },
            total_performers: total,
        }
    }

    pub fn performers(&self) -> &[PerformerView] {
        &self.performers
    }

    /// Performers currently playing, in tick order.
    pub fn playing(&self) -> impl Iterator<Item = &PerformerView> + '_ {
        self.performers
            .iter()
            .filter(|p| p.status == Status::Playing)
    }

    pub fn playing_count(&self) -> usize {
        self.playing().count()
    }

    pub fn min_pattern_index(&self) -> usize {
        self.min_pattern_index
    }

    pub fn max_pattern_index(&self) -> usize {
        self.max_pattern_index
    }

    pub fn average_pattern_index(&self) -> f64 {
        self.average_pattern_index
    }

    /// Fraction of all performers that are playing.
    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn total_performers(&self) -> usize {
        self.total_performers
    }

    pub fn get(&self, id: PerformerId) -> Option<&PerformerView> {
        self.performers.iter().find(|p| p.id == id)
    }
}
