//! Hourly bucket table and the day anchor it is indexed against.

use log::warn;

use super::BUCKET_COUNT;
use crate::error::TrackerError;
use crate::time::{SECONDS_PER_HOUR, Timestamp};

/// Anchor for the currently tracked day.
///
/// Every bucket index is computed relative to `start_of_day`. The anchor only
/// moves when a rollover is detected, and the table is cleared at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_of_day: Timestamp,
}

impl DayWindow {
    pub const fn new(start_of_day: Timestamp) -> Self {
        Self { start_of_day }
    }

    /// Start of the given hour of this day.
    pub const fn hour_start(&self, hour: usize) -> Timestamp {
        self.start_of_day + hour as i64 * SECONDS_PER_HOUR
    }

    /// Clamped bucket index of `timestamp` within this day.
    pub fn hour_index_of(&self, timestamp: Timestamp) -> usize {
        hour_index_of(timestamp, self.start_of_day)
    }
}

/// Hour of the day `timestamp` falls in, relative to `start_of_day`.
///
/// Results are clamped into `0..BUCKET_COUNT`: anything before the anchor
/// lands in bucket 0 and anything a day or more past it lands in bucket 23.
pub fn hour_index_of(timestamp: Timestamp, start_of_day: Timestamp) -> usize {
    match checked_hour_index(timestamp, start_of_day) {
        Ok(index) => index,
        Err(TrackerError::IndexOutOfRange(raw)) if raw < 0 => 0,
        Err(_) => BUCKET_COUNT - 1,
    }
}

/// Unclamped variant of [`hour_index_of`].
pub fn checked_hour_index(
    timestamp: Timestamp,
    start_of_day: Timestamp,
) -> Result<usize, TrackerError> {
    let raw = timestamp.saturating_sub(start_of_day) / SECONDS_PER_HOUR;
    if (0..BUCKET_COUNT as i64).contains(&raw) {
        Ok(raw as usize)
    } else {
        Err(TrackerError::IndexOutOfRange(raw))
    }
}

/// Step counts for each hour of the day.
///
/// Plain `[u32; 24]` so it lives on the stack or in a static with no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketTable {
    counts: [u32; BUCKET_COUNT],
}

impl Default for BucketTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketTable {
    pub const fn new() -> Self {
        Self {
            counts: [0; BUCKET_COUNT],
        }
    }

    /// Zero every bucket.
    pub fn reset(&mut self) {
        self.counts = [0; BUCKET_COUNT];
    }

    /// Count stored for `hour`. Out-of-range hours read as zero.
    pub fn get(&self, hour: usize) -> u32 {
        self.counts.get(hour).copied().unwrap_or(0)
    }

    /// Overwrite the count for `hour`.
    ///
    /// The caller is expected to pass an already clamped index; anything
    /// else is dropped with a warning.
    pub fn set(&mut self, hour: usize, value: u32) {
        match self.counts.get_mut(hour) {
            Some(slot) => *slot = value,
            None => warn!("Ignoring write to hour {} ({} steps)", hour, value),
        }
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0u32, |acc, &c| acc.saturating_add(c))
    }

    /// `(hour, count)` pairs for every bucket.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIDNIGHT: Timestamp = 1_710_028_800;

    #[test]
    fn test_hour_index_inside_day() {
        assert_eq!(hour_index_of(MIDNIGHT, MIDNIGHT), 0);
        assert_eq!(hour_index_of(MIDNIGHT + 3_599, MIDNIGHT), 0);
        assert_eq!(hour_index_of(MIDNIGHT + 3_600, MIDNIGHT), 1);
        assert_eq!(hour_index_of(MIDNIGHT + 23 * 3_600 + 59, MIDNIGHT), 23);
    }

    #[test]
    fn test_hour_index_clamps() {
        assert_eq!(hour_index_of(MIDNIGHT - 7_200, MIDNIGHT), 0);
        assert_eq!(hour_index_of(MIDNIGHT + 30 * 3_600, MIDNIGHT), 23);
        assert_eq!(hour_index_of(i64::MIN, MIDNIGHT), 0);
        assert_eq!(hour_index_of(i64::MAX, MIDNIGHT), 23);

        for offset in (-200_000..200_000).step_by(997) {
            assert!(hour_index_of(MIDNIGHT + offset, MIDNIGHT) < BUCKET_COUNT);
        }
    }

    #[test]
    fn test_checked_hour_index_reports_raw_value() {
        assert_eq!(
            checked_hour_index(MIDNIGHT + 25 * 3_600, MIDNIGHT),
            Err(TrackerError::IndexOutOfRange(25))
        );
        assert_eq!(checked_hour_index(MIDNIGHT + 3 * 3_600, MIDNIGHT), Ok(3));
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut table = BucketTable::new();
        for hour in 0..BUCKET_COUNT {
            table.set(hour, hour as u32 * 10 + 1);
        }
        table.reset();
        for hour in 0..BUCKET_COUNT {
            assert_eq!(table.get(hour), 0);
        }
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut table = BucketTable::new();
        table.set(BUCKET_COUNT, 99);
        assert_eq!(table.total(), 0);
        assert_eq!(table.get(BUCKET_COUNT), 0);
    }

    #[test]
    fn test_total() {
        let mut table = BucketTable::new();
        table.set(6, 120);
        table.set(7, 300);
        assert_eq!(table.total(), 420);
        assert_eq!(table.iter().filter(|&(_, c)| c > 0).count(), 2);
    }

    #[test]
    fn test_day_window_hour_start() {
        let day = DayWindow::new(MIDNIGHT);
        assert_eq!(day.hour_start(6), MIDNIGHT + 6 * 3_600);
        assert_eq!(day.hour_index_of(MIDNIGHT + 6 * 3_600 + 5), 6);
    }
}
