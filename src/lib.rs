//! Ostinato — a seeded ensemble of simulated performers improvising a
//! minimalist score, paced in real time by a lookahead scheduler.
//!
//! Layers, leaf first: [`rng`] → [`humanize`] → [`performer`] → [`ensemble`]
//! → [`scheduler`]. Everything below the scheduler is deterministic for a
//! given seed and performer count.

pub mod config;
pub mod ensemble;
pub mod event;
pub mod humanize;
pub mod osc;
pub mod performer;
pub mod rng;
pub mod scheduler;
pub mod score;
pub mod session;

pub use config::{ConfigError, EnsembleConfig};
pub use ensemble::{Ensemble, EnsembleSnapshot};
pub use rng::SeededRng;
pub use scheduler::Scheduler;
pub use session::{Session, SessionError};
