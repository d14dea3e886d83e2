//! Tracker configuration.
//!
//! Every value here is fixed for the lifetime of a tracker. [`TrackerConfig::DEFAULT`]
//! matches the stock watchface: hours 6 through 21 tracked, 250 steps an hour
//! lights the top cell, five intensity levels.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::storage::BUCKET_COUNT;

/// Upper bound on intensity levels, set by the palette size.
pub const MAX_LEVELS: u8 = 8;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// First tracked hour of the day (0-23).
    pub window_start_hour: u8,
    /// Number of tracked hours starting at `window_start_hour`.
    pub window_hours: u8,
    /// Steps in one hour that map to the top intensity level.
    pub hourly_goal: u32,
    /// Steps in one day that map to the top intensity level.
    pub daily_goal: u32,
    /// Number of ordinal intensity levels.
    pub num_levels: u8,
    /// Delay before the first backfill step, in milliseconds.
    pub backfill_start_delay_ms: u32,
    /// Delay between consecutive backfill steps, in milliseconds.
    pub backfill_step_delay_ms: u32,
    /// Steady-state refresh interval, in seconds.
    pub tick_interval_secs: u32,
}

impl TrackerConfig {
    pub const DEFAULT: Self = Self {
        window_start_hour: 6,
        window_hours: 16,
        hourly_goal: 250,
        daily_goal: 10_000,
        num_levels: 5,
        backfill_start_delay_ms: 500,
        backfill_step_delay_ms: 100,
        tick_interval_secs: 60,
    };

    /// One past the last tracked hour.
    pub const fn window_end_hour(&self) -> u8 {
        self.window_start_hour.saturating_add(self.window_hours)
    }

    /// Whether `hour` is inside the active window.
    pub const fn in_window(&self, hour: usize) -> bool {
        hour >= self.window_start_hour as usize && hour < self.window_end_hour() as usize
    }

    pub const fn backfill_start_delay(&self) -> Duration {
        Duration::from_millis(self.backfill_start_delay_ms as u64)
    }

    pub const fn backfill_step_delay(&self) -> Duration {
        Duration::from_millis(self.backfill_step_delay_ms as u64)
    }

    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs as u64)
    }

    /// Check the configuration for values the tracker cannot work with.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.num_levels == 0 || self.num_levels > MAX_LEVELS {
            return Err(TrackerError::InvalidConfig("num_levels must be 1..=8"));
        }
        if self.hourly_goal == 0 || self.daily_goal == 0 {
            return Err(TrackerError::InvalidConfig("goals must be non-zero"));
        }
        if self.window_hours == 0 {
            return Err(TrackerError::InvalidConfig("window must cover at least one hour"));
        }
        if self.window_start_hour as usize + self.window_hours as usize > BUCKET_COUNT {
            return Err(TrackerError::InvalidConfig("window runs past the end of the day"));
        }
        if self.tick_interval_secs == 0 {
            return Err(TrackerError::InvalidConfig("tick interval must be non-zero"));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TrackerConfig::default().validate(), Ok(()));
        assert_eq!(TrackerConfig::DEFAULT.window_end_hour(), 22);
    }

    #[test]
    fn test_window_membership() {
        let config = TrackerConfig::DEFAULT;
        assert!(!config.in_window(5));
        assert!(config.in_window(6));
        assert!(config.in_window(21));
        assert!(!config.in_window(22));
    }

    #[test]
    fn test_rejects_window_past_midnight() {
        let config = TrackerConfig {
            window_start_hour: 20,
            window_hours: 6,
            ..TrackerConfig::DEFAULT
        };
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_goal_and_levels() {
        let zero_goal = TrackerConfig {
            hourly_goal: 0,
            ..TrackerConfig::DEFAULT
        };
        assert!(zero_goal.validate().is_err());

        let zero_levels = TrackerConfig {
            num_levels: 0,
            ..TrackerConfig::DEFAULT
        };
        assert!(zero_levels.validate().is_err());
    }

    #[test]
    fn test_delays() {
        let config = TrackerConfig::DEFAULT;
        assert_eq!(config.backfill_start_delay().as_millis(), 500);
        assert_eq!(config.backfill_step_delay().as_millis(), 100);
        assert_eq!(config.tick_interval().as_secs(), 60);
    }
}
