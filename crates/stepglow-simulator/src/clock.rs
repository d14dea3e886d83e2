//! Host wall clock with an optional speed-up factor.

use std::time::Instant;

use chrono::{Local, TimeZone};
use stepglow_core::time::{Clock, Timestamp, start_of_day_at_offset};

/// Wall clock that can run faster than real time.
///
/// Simulated time starts at the real current time and advances `speed`
/// seconds per real second, so a whole day can be watched in minutes.
pub struct SimClock {
    epoch: Timestamp,
    started: Instant,
    speed: u32,
}

impl SimClock {
    pub fn new(speed: u32) -> Self {
        Self {
            epoch: Local::now().timestamp(),
            started: Instant::now(),
            speed: speed.max(1),
        }
    }

    /// Simulated milliseconds since the clock was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64 * self.speed as u64
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        self.epoch + (self.elapsed_ms() / 1000) as Timestamp
    }

    fn start_of_day(&self, at: Timestamp) -> Timestamp {
        Local
            .timestamp_opt(at, 0)
            .single()
            .and_then(|local| local.date_naive().and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
            .map(|midnight| midnight.timestamp())
            .unwrap_or_else(|| start_of_day_at_offset(at, 0))
    }
}
