//! TOML topic configuration (§6.1), an adapter around [`region::TopicConfig`].
//!
//! This is deliberately the only place in the crate that pulls in `serde` +
//! `toml` — parsing stays at the process boundary, never on the hot path.

use crate::error::{BusError, Result};
use crate::region::{RingType, TopicConfig};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "topic", default)]
    topics: Vec<RawTopic>,
}

#[derive(Deserialize)]
struct RawTopic {
    name: String,
    slot_count: usize,
    payload_size: usize,
    kind: RawKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Swmr,
    Mwmr,
}

/// A deserialized, ready-to-build set of topic configurations.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub topics: Vec<TopicConfig>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| BusError::InvalidConfig(format!("invalid config TOML: {e}")))?;

        let topics = raw
            .topics
            .into_iter()
            .map(|t| {
                let ring_type = match t.kind {
                    RawKind::Swmr => RingType::Swmr,
                    RawKind::Mwmr => RingType::Mwmr,
                };
                TopicConfig::new(t.name, t.slot_count, t.payload_size, ring_type)
            })
            .collect();

        Ok(Self { topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_topic_list() {
        let text = r#"
            [[topic]]
            name = "t1"
            slot_count = 1024
            payload_size = 64
            kind = "swmr"

            [[topic]]
            name = "t2"
            slot_count = 4
            payload_size = 128
            kind = "mwmr"
        "#;
        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.topics.len(), 2);
        assert_eq!(config.topics[0].name, "t1");
        assert_eq!(config.topics[0].ring_type, RingType::Swmr);
        assert_eq!(config.topics[1].ring_type, RingType::Mwmr);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::from_toml_str("not valid [[[ toml").is_err());
    }
}
