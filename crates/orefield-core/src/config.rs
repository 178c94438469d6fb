//! Economy tuning loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! tick_interval_ms = 1000
//! arrival_threshold = 0.5
//! leash_slack = 1.5
//! rng_seed = 0
//! event_capacity = 4096
//! ```

use crate::event::DEFAULT_EVENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    #[error("arrival threshold must be positive and finite, got {0}")]
    InvalidArrivalThreshold(f64),
    #[error("leash slack must be at least 1.0, got {0}")]
    InvalidLeashSlack(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Wall-clock time between scheduler ticks.
    pub tick_interval_ms: u64,
    /// Distance at which a worker is standing on its mining spot.
    pub arrival_threshold: f64,
    /// How far past `arrival_threshold` a mining worker may drift, as a
    /// multiplier, before it is pulled off the job.
    pub leash_slack: f64,
    /// Seed handed to randomized abilities built from this config.
    pub rng_seed: u64,
    /// Most events buffered between drains; older ones are evicted.
    pub event_capacity: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            arrival_threshold: 0.5,
            leash_slack: 1.5,
            rng_seed: 0,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EconomyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !(self.arrival_threshold.is_finite() && self.arrival_threshold > 0.0) {
            return Err(ConfigError::InvalidArrivalThreshold(self.arrival_threshold));
        }
        if !(self.leash_slack.is_finite() && self.leash_slack >= 1.0) {
            return Err(ConfigError::InvalidLeashSlack(self.leash_slack));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
