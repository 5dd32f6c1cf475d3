//! EngineConfig - エンジンの設定値と起動時検証

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, MessageTemplate};
use crate::outbox::{DEFAULT_CAPACITY, RetryPolicy};

/// Everything the engine needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JSON file holding the recipient store.
    pub data_file: PathBuf,

    /// Time between poll cycles.
    pub poll_interval: Duration,

    /// Outbox capacity; producers wait when it is full.
    pub outbox_capacity: usize,

    pub retry: RetryPolicy,

    /// Delay before an on-demand reply is enqueued.
    pub reply_delay: Duration,

    pub message: MessageTemplate,
}

impl EngineConfig {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingDataFile);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.outbox_capacity == 0 {
            return Err(ConfigError::ZeroOutboxCapacity);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        if !self.retry.multiplier.is_finite() || self.retry.multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::new(),
            poll_interval: Duration::from_secs(5 * 60),
            outbox_capacity: DEFAULT_CAPACITY,
            retry: RetryPolicy::default(),
            reply_delay: Duration::from_millis(500),
            message: MessageTemplate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::new("db.json");
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.outbox_capacity, 10_000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.reply_delay, Duration::from_millis(500));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn missing_data_file_is_rejected() {
        assert_eq!(
            EngineConfig::default().validate(),
            Err(ConfigError::MissingDataFile)
        );
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut config = EngineConfig::new("db.json");
        config.poll_interval = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));

        let mut config = EngineConfig::new("db.json");
        config.outbox_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroOutboxCapacity));

        let mut config = EngineConfig::new("db.json");
        config.retry.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxAttempts));
    }

    #[test]
    fn bad_multipliers_are_rejected() {
        for multiplier in [-1.0, 0.5, f64::NAN, f64::INFINITY] {
            let mut config = EngineConfig::new("db.json");
            config.retry.multiplier = multiplier;
            assert_eq!(config.validate(), Err(ConfigError::InvalidMultiplier));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "data_file": "/var/lib/tidewatch/db.json" }"#).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/var/lib/tidewatch/db.json"));
        assert_eq!(config.outbox_capacity, 10_000);
    }
}
