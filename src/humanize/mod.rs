//! Humanization — expressive variation layered over mechanical playback.
//!
//! Both models are pure functions of their context plus an injected
//! [`SeededRng`](crate::rng::SeededRng). When disabled they return the
//! neutral value exactly (velocity 1.0, timing offset 0.0).

pub mod timing;
pub mod velocity;

pub use timing::{
    advance_rubato, compute_rubato_multiplier, compute_swing_offset, compute_timing_offset,
    RubatoState, TimingContext, TimingPersonality, MAX_TIMING_OFFSET,
};
pub use velocity::{
    compute_velocity, VelocityContext, VelocityPersonality, MAX_VELOCITY, MIN_VELOCITY,
};

use serde::{Deserialize, Serialize};

/// How strongly humanization is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Subtle,
    #[default]
    Moderate,
    Expressive,
}

impl Intensity {
    /// Multiplier applied to every variation range.
    pub fn scale(self) -> f64 {
        match self {
            Intensity::Subtle => 0.4,
            Intensity::Moderate => 0.7,
            Intensity::Expressive => 1.0,
        }
    }
}

/// Toggle + intensity for one humanization layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanizeConfig {
    pub enabled: bool,
    pub intensity: Intensity,
}

impl HumanizeConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            intensity: Intensity::default(),
        }
    }

    /// Intensity scale, or 0.0 when disabled.
    pub fn effective_scale(&self) -> f64 {
        if self.enabled {
            self.intensity.scale()
        } else {
            0.0
        }
    }
}

impl Default for HumanizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: Intensity::default(),
        }
    }
}

/// Humanization settings for both layers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Humanization {
    pub velocity: HumanizeConfig,
    pub timing: HumanizeConfig,
}

impl Humanization {
    /// Both layers off: velocity 1.0 and zero timing offset for every note.
    pub fn off() -> Self {
        Self {
            velocity: HumanizeConfig::disabled(),
            timing: HumanizeConfig::disabled(),
        }
    }
}
