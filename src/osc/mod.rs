//! OSC (Open Sound Control) output — send scheduled notes to an external synth over UDP.

pub mod config;
pub mod sender;

pub use config::OscConfig;
pub use sender::{OscError, OscNoteSink};
