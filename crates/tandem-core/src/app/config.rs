//! Configuration for the dual-write coordinator.
//!
//! Supports JSON and environment variable overrides:
//! - `TANDEM_PUBLISH_TIMEOUT_MS`
//! - `TANDEM_TOPIC`
//! - `TANDEM_CORRELATION_IDS`

use std::time::Duration;

use serde::Deserialize;

/// Default broker acknowledgment wait (30s, same as the services' broker send timeout).
pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("publish_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DualWriteConfig {
    /// How long to wait for the broker to acknowledge a publish.
    pub publish_timeout_ms: u64,
    /// Topic override. Defaults to `<record kind>.events`.
    pub topic: Option<String>,
    /// Attach a ULID correlation id to every published event.
    pub correlation_ids: bool,
}

impl Default for DualWriteConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: DEFAULT_PUBLISH_TIMEOUT_MS,
            topic: None,
            correlation_ids: true,
        }
    }
}

impl DualWriteConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()
    }

    /// Defaults overridden by `TANDEM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (env, test map, ...).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const TIMEOUT: &str = "TANDEM_PUBLISH_TIMEOUT_MS";
        const TOPIC: &str = "TANDEM_TOPIC";
        const CORRELATION: &str = "TANDEM_CORRELATION_IDS";

        if let Some(value) = lookup(TIMEOUT) {
            self.publish_timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: TIMEOUT,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(TOPIC)
            && !value.trim().is_empty()
        {
            self.topic = Some(value.trim().to_string());
        }
        if let Some(value) = lookup(CORRELATION) {
            self.correlation_ids = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: CORRELATION,
                        value,
                    });
                }
            };
        }
        self.validate()
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Topic for records of `kind`.
    pub fn topic_for(&self, kind: &str) -> String {
        self.topic
            .clone()
            .unwrap_or_else(|| format!("{kind}.events"))
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.publish_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_services() {
        let config = DualWriteConfig::default();
        assert_eq!(config.publish_timeout(), Duration::from_secs(30));
        assert_eq!(config.topic_for("user"), "user.events");
        assert!(config.correlation_ids);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = DualWriteConfig::from_json_str(r#"{ "topic": "friends" }"#).unwrap();
        assert_eq!(config.topic_for("friend"), "friends");
        assert_eq!(config.publish_timeout_ms, DEFAULT_PUBLISH_TIMEOUT_MS);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = DualWriteConfig::default()
            .with_overrides(lookup_from(&[
                ("TANDEM_PUBLISH_TIMEOUT_MS", "250"),
                ("TANDEM_CORRELATION_IDS", "off"),
            ]))
            .unwrap();
        assert_eq!(config.publish_timeout(), Duration::from_millis(250));
        assert!(!config.correlation_ids);
        assert_eq!(config.topic, None);
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let err = DualWriteConfig::default()
            .with_overrides(lookup_from(&[("TANDEM_PUBLISH_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { key: "TANDEM_PUBLISH_TIMEOUT_MS", .. }
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = DualWriteConfig::from_json_str(r#"{ "publish_timeout_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }
}
