use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Interface tuning.
///
/// Deserializable with every field optional; durations are given in
/// milliseconds (`reconnection_interval_ms`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Delay before an automatic reconnect after the link drops. Zero disables it.
    #[serde(rename = "reconnection_interval_ms", deserialize_with = "millis")]
    pub reconnection_interval: Duration,
    /// Ceiling on the size of one batched execute payload.
    pub chunk_size: usize,
    /// How long the worker waits for a burst to accumulate before draining.
    /// Zero means a single cooperative yield.
    #[serde(rename = "coalesce_window_ms", deserialize_with = "millis")]
    pub coalesce_window: Duration,
    /// Buffer size of the application event broadcast.
    pub event_capacity: usize,
    /// Connect timeout used by automatic reconnects.
    #[serde(rename = "reconnect_timeout_ms", deserialize_with = "millis")]
    pub reconnect_timeout: Duration,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            reconnection_interval: Duration::from_millis(1000),
            chunk_size: 4096,
            coalesce_window: Duration::ZERO,
            event_capacity: 256,
            reconnect_timeout: Duration::from_secs(10),
        }
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: InterfaceConfig =
            serde_json::from_str(r#"{"chunk_size": 512, "reconnection_interval_ms": 0}"#).unwrap();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.reconnection_interval, Duration::ZERO);
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.reconnect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn empty_object_is_default() {
        let config: InterfaceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, InterfaceConfig::default());
    }
}
