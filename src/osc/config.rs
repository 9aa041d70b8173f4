//! OSC configuration — target address and message prefix.

use serde::{Deserialize, Serialize};

/// Where notes are sent and under which address prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscConfig {
    /// `host:port` of the receiving synth.
    #[serde(default = "default_target")]
    pub target: String,
    /// Address prefix, e.g. `/ostinato` gives `/ostinato/note_on`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_target() -> String {
    "127.0.0.1:57120".to_string()
}

fn default_prefix() -> String {
    "/ostinato".to_string()
}

impl OscConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            prefix: default_prefix(),
        }
    }

    /// Full address for a message `name` under the prefix.
    pub fn address(&self, name: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), name)
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            prefix: default_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OscConfig::default();
        assert_eq!(config.target, "127.0.0.1:57120");
        assert_eq!(config.address("note_on"), "/ostinato/note_on");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let config = OscConfig {
            target: "127.0.0.1:9000".into(),
            prefix: "/incee/".into(),
        };
        assert_eq!(config.address("pulse"), "/incee/pulse");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: OscConfig = serde_yaml::from_str("target: \"10.0.0.2:7000\"\n").unwrap();
        assert_eq!(config.target, "10.0.0.2:7000");
        assert_eq!(config.prefix, "/ostinato");
    }
}
