//! Download simulation configuration

use std::ops::RangeInclusive;
use std::time::Duration;

/// Configuration for the simulated background download.
///
/// Every `tick_interval`, an in-flight download advances by a random amount
/// drawn uniformly from `min_increment..=max_increment` percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Time between progress ticks (default: 250ms)
    pub tick_interval: Duration,

    /// Smallest per-tick increment in percent (default: 4)
    pub min_increment: u8,

    /// Largest per-tick increment in percent (default: 11)
    pub max_increment: u8,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
            min_increment: 4,
            max_increment: 11,
        }
    }
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the inclusive increment range.
    pub fn with_increment_range(mut self, min: u8, max: u8) -> Self {
        self.min_increment = min;
        self.max_increment = max;
        self
    }

    pub fn increment_range(&self) -> RangeInclusive<u8> {
        self.min_increment..=self.max_increment
    }

    /// Worst-case number of ticks before a download completes.
    pub fn max_ticks(&self) -> u32 {
        100_u32.div_ceil(u32::from(self.min_increment.max(1)))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be greater than 0".to_string());
        }

        if self.min_increment == 0 {
            return Err("min_increment must be at least 1".to_string());
        }

        if self.min_increment > self.max_increment {
            return Err(format!(
                "min_increment ({}) must not exceed max_increment ({})",
                self.min_increment, self.max_increment
            ));
        }

        if self.max_increment > 100 {
            return Err("max_increment must be at most 100".to_string());
        }

        Ok(())
    }
}
