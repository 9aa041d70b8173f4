//! Ensemble configuration — YAML load/save at ~/.ostinato/config.yaml.
//!
//! Every field has a default, so a partial file (or none at all) is valid.
//! Values from outside are untrusted: [`EnsembleConfig::clamped`] pulls each
//! one into its allowed range before a session sees it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::{DEFAULT_BPM, MAX_BPM, MIN_BPM};
use crate::humanize::Humanization;
use crate::osc::OscConfig;
use crate::performer::decision::DEFAULT_ADVANCE_WEIGHT;

pub const MIN_PERFORMERS: usize = 2;
pub const MAX_PERFORMERS: usize = 16;
pub const DEFAULT_PERFORMERS: usize = 6;

pub const MIN_ADVANCE_WEIGHT: f64 = 0.1;
pub const MAX_ADVANCE_WEIGHT: f64 = 0.6;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Everything needed to set up a performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub bpm: f64,
    pub performers: usize,
    /// Fixed seed for a reproducible performance; absent picks one at start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    pub advance_weight: f64,
    pub humanization: Humanization,
    /// Play the steady high-C reference pulse.
    pub pulse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osc: Option<OscConfig>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            performers: DEFAULT_PERFORMERS,
            seed: None,
            advance_weight: DEFAULT_ADVANCE_WEIGHT,
            humanization: Humanization::default(),
            pulse: false,
            osc: None,
        }
    }
}

/// Default path for the config file.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".ostinato");
    path.push("config.yaml");
    path
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl EnsembleConfig {
    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load from [`default_config_path`].
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&default_config_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// A copy with every numeric field inside its allowed range.
    pub fn clamped(&self) -> Self {
        Self {
            bpm: clamp_or(self.bpm, MIN_BPM, MAX_BPM, DEFAULT_BPM),
            performers: self.performers.clamp(MIN_PERFORMERS, MAX_PERFORMERS),
            advance_weight: clamp_or(
                self.advance_weight,
                MIN_ADVANCE_WEIGHT,
                MAX_ADVANCE_WEIGHT,
                DEFAULT_ADVANCE_WEIGHT,
            ),
            ..self.clone()
        }
    }
}
