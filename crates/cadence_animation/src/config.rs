//! Scheduler configuration (`cadence.toml`)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Timing configuration for an [`AnimationScheduler`](crate::AnimationScheduler)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Nominal period of the animation tick in milliseconds
    #[serde(default = "default_timer_interval")]
    pub timer_interval_ms: u64,
    /// Advance every tick by exactly `timer_interval_ms` instead of the
    /// measured elapsed time. Useful for frame-exact recording and tests.
    #[serde(default)]
    pub consistent_timing: bool,
}

fn default_timer_interval() -> u64 {
    16
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timer_interval_ms: default_timer_interval(),
            consistent_timing: false,
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Save to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Builder: set the tick interval
    pub fn with_timer_interval(mut self, ms: u64) -> Self {
        self.timer_interval_ms = ms;
        self
    }

    /// Builder: enable or disable consistent timing
    pub fn with_consistent_timing(mut self, enabled: bool) -> Self {
        self.consistent_timing = enabled;
        self
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }
}
