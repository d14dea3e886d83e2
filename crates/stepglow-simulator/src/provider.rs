//! Synthetic minute history.
//!
//! Step counts are derived from a hash of the minute so the same range always
//! reads back the same total, with more activity around commute and lunch
//! hours. A few hours report no data at all to exercise the unavailable path.

use stepglow_core::health::{MinuteBuffer, MinuteHistory, MinuteSample};
use stepglow_core::time::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, Timestamp};

/// Every `OUTAGE_EVERY`-th hour since the epoch has no data.
const OUTAGE_EVERY: i64 = 11;

pub struct SyntheticHistory {
    utc_offset_secs: i64,
}

impl SyntheticHistory {
    pub fn new(utc_offset_secs: i32) -> Self {
        Self {
            utc_offset_secs: utc_offset_secs as i64,
        }
    }

    fn local_hour(&self, at: Timestamp) -> i64 {
        (at + self.utc_offset_secs).rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR
    }

    fn sample(&self, minute_start: Timestamp) -> MinuteSample {
        let minute = (minute_start / SECONDS_PER_MINUTE) as u64;
        let hash = minute.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 56;

        if hash == 0xFF {
            return MinuteSample::invalid();
        }

        let busy = matches!(self.local_hour(minute_start), 7..=8 | 12 | 17..=18);
        let threshold = if busy { 120 } else { 40 };
        if hash < threshold {
            MinuteSample::valid((hash % 24) as u16 + 4)
        } else {
            MinuteSample::valid(0)
        }
    }
}

impl MinuteHistory for SyntheticHistory {
    fn metric_accessible(&self, start: Timestamp, _end: Timestamp) -> bool {
        (start / SECONDS_PER_HOUR) % OUTAGE_EVERY != 3
    }

    fn minute_history(&mut self, buf: &mut MinuteBuffer, start: Timestamp, end: Timestamp) {
        let mut minute = start;
        while minute + SECONDS_PER_MINUTE <= end {
            if buf.push(self.sample(minute)).is_err() {
                break;
            }
            minute += SECONDS_PER_MINUTE;
        }
    }
}
