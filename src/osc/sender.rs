//! UDP sink that turns scheduled notes into OSC messages.
//!
//! Messages, under the configured prefix:
//!
//! | address | arguments |
//! |---|---|
//! | `note_on` | performer (int), midi (int), frequency (float), velocity (float), duration s (float), time s (double) |
//! | `note_off` | performer (int), midi (int) |
//! | `pulse` | time s (double), duration s (float) |
//! | `all_off` | none |
//!
//! Send failures are logged and dropped; a missing synth never stops the performance.

use std::net::UdpSocket;

use rosc::{encoder, OscMessage, OscPacket, OscType};

use super::config::OscConfig;
use crate::event::{NoteRelease, ScheduledNote};
use crate::scheduler::NoteSink;

#[derive(Debug, thiserror::Error)]
pub enum OscError {
    #[error("osc socket: {0}")]
    Io(#[from] std::io::Error),
    #[error("osc encode: {0}")]
    Encode(#[from] rosc::OscError),
}

/// Sends notes to an OSC receiver.
pub struct OscNoteSink {
    socket: UdpSocket,
    config: OscConfig,
    failures: u64,
}

impl OscNoteSink {
    /// Bind a local UDP socket for sending to `config.target`.
    pub fn connect(config: OscConfig) -> Result<Self, OscError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        log::info!("OSC output -> {}{}", config.target, config.prefix);
        Ok(Self {
            socket,
            config,
            failures: 0,
        })
    }

    pub fn config(&self) -> &OscConfig {
        &self.config
    }

    /// Messages that could not be sent so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn send(&self, name: &str, args: Vec<OscType>) -> Result<(), OscError> {
        let packet = OscPacket::Message(OscMessage {
            addr: self.config.address(name),
            args,
        });
        let buf = encoder::encode(&packet)?;
        self.socket.send_to(&buf, &self.config.target)?;
        Ok(())
    }

    fn send_logged(&mut self, name: &str, args: Vec<OscType>) {
        if let Err(e) = self.send(name, args) {
            self.failures += 1;
            // warn once, later failures at debug
            if self.failures == 1 {
                log::warn!("OSC {} to {} failed: {}", name, self.config.target, e);
            } else {
                log::debug!("OSC {} failed: {}", name, e);
            }
        }
    }
}

pub(crate) fn note_on_args(note: &ScheduledNote) -> Vec<OscType> {
    vec![
        OscType::Int(note.performer_id.0 as i32),
        OscType::Int(note.pitch as i32),
        OscType::Float(note.frequency() as f32),
        OscType::Float(note.velocity as f32),
        OscType::Float(note.duration_secs as f32),
        OscType::Double(note.time),
    ]
}

impl NoteSink for OscNoteSink {
    fn note_on(&mut self, note: &ScheduledNote) {
        self.send_logged("note_on", note_on_args(note));
    }

    fn note_off(&mut self, release: &NoteRelease) {
        self.send_logged(
            "note_off",
            vec![
                OscType::Int(release.performer_id.0 as i32),
                OscType::Int(release.pitch as i32),
            ],
        );
    }

    fn pulse(&mut self, time: f64, duration: f64) {
        self.send_logged(
            "pulse",
            vec![OscType::Double(time), OscType::Float(duration as f32)],
        );
    }

    fn silence_all(&mut self) {
        self.send_logged("all_off", Vec::new());
    }

    fn name(&self) -> &str {
        "osc"
    }
}
