//! # Controller Configuration
//!
//! Timing and startup settings for the queue controller.

use bridge_traits::RepeatMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// How often the engine position is sampled while playing.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_position_interval_ms")]
    pub position_interval_ms: u64,

    /// Delay between an engine error and the automatic advance to the next
    /// entry.
    ///
    /// Default: 1000 ms.
    #[serde(default = "default_error_recovery_delay_ms")]
    pub error_recovery_delay_ms: u64,

    /// Repeat mode applied when the controller starts.
    ///
    /// Default: off.
    #[serde(default)]
    pub initial_repeat_mode: RepeatMode,

    /// Start remote playback without waiting for the cache fill.
    ///
    /// When false, uncached tracks are downloaded first and played from disk.
    ///
    /// Default: true.
    #[serde(default = "default_stream_while_caching")]
    pub stream_while_caching: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            position_interval_ms: default_position_interval_ms(),
            error_recovery_delay_ms: default_error_recovery_delay_ms(),
            initial_repeat_mode: RepeatMode::default(),
            stream_while_caching: default_stream_while_caching(),
        }
    }
}

impl ControllerConfig {
    pub fn position_interval(&self) -> Duration {
        Duration::from_millis(self.position_interval_ms)
    }

    pub fn error_recovery_delay(&self) -> Duration {
        Duration::from_millis(self.error_recovery_delay_ms)
    }

    pub fn with_position_interval(mut self, interval: Duration) -> Self {
        self.position_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_error_recovery_delay(mut self, delay: Duration) -> Self {
        self.error_recovery_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.initial_repeat_mode = mode;
        self
    }

    pub fn with_stream_while_caching(mut self, enabled: bool) -> Self {
        self.stream_while_caching = enabled;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.position_interval_ms == 0 {
            return Err("position_interval_ms must be > 0".to_string());
        }

        if self.position_interval_ms > 60_000 {
            return Err("position_interval_ms cannot exceed one minute".to_string());
        }

        if self.error_recovery_delay_ms > 60_000 {
            return Err("error_recovery_delay_ms cannot exceed one minute".to_string());
        }

        Ok(())
    }
}

fn default_position_interval_ms() -> u64 {
    500
}

fn default_error_recovery_delay_ms() -> u64 {
    1000
}

fn default_stream_while_caching() -> bool {
    true
}
