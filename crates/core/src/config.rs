//! Simulator configuration
//!
//! Timing knobs for the lifecycle engine, the query engine and the waiter.
//! Defaults reproduce the pacing of the simulated provider: 5s per lifecycle
//! step, 1s query latency, waiters polling every 5s up to 40 times.
//!
//! ## File Format
//!
//! ```toml
//! state_change_delay_ms = 5000
//! describe_delay_ms = 1000
//! images = ["ami-00000000"]
//!
//! [waiter]
//! delay_ms = 5000
//! max_attempts = 40
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use crate::error::{Error, Result};
use crate::instance::DEFAULT_IMAGE_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay before each lifecycle step
pub const DEFAULT_STATE_CHANGE_DELAY_MS: u64 = 5_000;

/// Default query latency
pub const DEFAULT_DESCRIBE_DELAY_MS: u64 = 1_000;

/// Default waiter poll interval
pub const DEFAULT_WAITER_DELAY_MS: u64 = 5_000;

/// Default waiter attempt budget
pub const DEFAULT_WAITER_MAX_ATTEMPTS: u32 = 40;

/// Waiter pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaiterConfig {
    /// Sleep before each poll, in milliseconds
    pub delay_ms: u64,
    /// Maximum number of polls
    pub max_attempts: u32,
}

impl WaiterConfig {
    /// Sleep before each poll
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidParameter(
                "waiter.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_WAITER_DELAY_MS,
            max_attempts: DEFAULT_WAITER_MAX_ATTEMPTS,
        }
    }
}

/// Full simulator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Delay before each lifecycle step, in milliseconds
    pub state_change_delay_ms: u64,
    /// Query latency, in milliseconds
    pub describe_delay_ms: u64,
    /// Image catalog served by `describe_images`
    pub images: Vec<String>,
    /// Waiter pacing
    pub waiter: WaiterConfig,
}

impl SimConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudsim_core::config::SimConfig;
    ///
    /// let config = SimConfig::from_toml_str("describe_delay_ms = 10").unwrap();
    /// assert_eq!(config.describe_delay_ms, 10);
    /// assert_eq!(config.waiter.max_attempts, 40);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Delay before each lifecycle step
    pub fn state_change_delay(&self) -> Duration {
        Duration::from_millis(self.state_change_delay_ms)
    }

    /// Query latency
    pub fn describe_delay(&self) -> Duration {
        Duration::from_millis(self.describe_delay_ms)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        self.waiter.validate()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            state_change_delay_ms: DEFAULT_STATE_CHANGE_DELAY_MS,
            describe_delay_ms: DEFAULT_DESCRIBE_DELAY_MS,
            images: vec![DEFAULT_IMAGE_ID.to_string()],
            waiter: WaiterConfig::default(),
        }
    }
}
