//! Time primitives and the clock collaborator.
//!
//! Timestamps are plain signed seconds since the Unix epoch. The clock is
//! injected so the tracker can be driven deterministically in tests and by
//! the simulator.

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const MINUTES_PER_HOUR: usize = 60;
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Source of wall-clock time.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Timestamp;

    /// Local midnight of the day containing `at`.
    fn start_of_day(&self, at: Timestamp) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn start_of_day(&self, at: Timestamp) -> Timestamp {
        (**self).start_of_day(at)
    }
}

/// Midnight of the day containing `at` for a fixed offset from UTC.
///
/// `utc_offset_secs` is positive east of Greenwich.
pub const fn start_of_day_at_offset(at: Timestamp, utc_offset_secs: i32) -> Timestamp {
    let local = at + utc_offset_secs as i64;
    local - local.rem_euclid(SECONDS_PER_DAY) - utc_offset_secs as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day_utc() {
        // 2024-03-10 14:25:00 UTC
        let t = 1_710_080_700;
        assert_eq!(start_of_day_at_offset(t, 0), 1_710_028_800);
    }

    #[test]
    fn test_start_of_day_with_offset() {
        // 2024-03-10 01:00 UTC is still 2024-03-09 in UTC-5
        let t = 1_710_032_400;
        let midnight = start_of_day_at_offset(t, -5 * 3600);
        assert_eq!(midnight, 1_709_960_400);
        assert!(midnight <= t && t - midnight < SECONDS_PER_DAY);
    }
}
