//! Minute-history data provider and step summation.
//!
//! The platform health service is only reachable through [`MinuteHistory`].
//! Hourly totals are built by summing per-minute records because the
//! aggregate sum offered by typical health APIs is a weighted average rather
//! than an exact count.

use heapless::Vec;
use log::debug;

use crate::error::TrackerError;
use crate::time::{MINUTES_PER_HOUR, Timestamp};

/// Buffer holding at most one hour of minute records.
pub type MinuteBuffer = Vec<MinuteSample, MINUTES_PER_HOUR>;

/// One minute of step history as reported by the health service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinuteSample {
    /// Steps counted during the minute
    pub steps: u16,
    /// Set when the service could not record this minute
    pub is_invalid: bool,
}

impl MinuteSample {
    pub const fn valid(steps: u16) -> Self {
        Self {
            steps,
            is_invalid: false,
        }
    }

    pub const fn invalid() -> Self {
        Self {
            steps: 0,
            is_invalid: true,
        }
    }
}

/// Per-minute step history provider.
pub trait MinuteHistory {
    /// Whether step data can be read for `[start, end)` at all.
    fn metric_accessible(&self, start: Timestamp, end: Timestamp) -> bool;

    /// Fill `buf` with the minute records for `[start, end)`.
    ///
    /// Implementations push at most `buf.capacity()` records; the caller
    /// never asks for more than one hour.
    fn minute_history(&mut self, buf: &mut MinuteBuffer, start: Timestamp, end: Timestamp);
}

impl<M: MinuteHistory + ?Sized> MinuteHistory for &mut M {
    fn metric_accessible(&self, start: Timestamp, end: Timestamp) -> bool {
        (**self).metric_accessible(start, end)
    }

    fn minute_history(&mut self, buf: &mut MinuteBuffer, start: Timestamp, end: Timestamp) {
        (**self).minute_history(buf, start, end)
    }
}

/// Total steps recorded in `[start, end)`.
///
/// Invalid minutes are skipped. Returns [`TrackerError::DataUnavailable`]
/// when the provider has no data for the range.
pub fn query_range<M: MinuteHistory + ?Sized>(
    provider: &mut M,
    start: Timestamp,
    end: Timestamp,
) -> Result<u32, TrackerError> {
    if !provider.metric_accessible(start, end) {
        return Err(TrackerError::DataUnavailable { start, end });
    }

    let mut buf = MinuteBuffer::new();
    provider.minute_history(&mut buf, start, end);

    let steps: u32 = buf
        .iter()
        .filter(|sample| !sample.is_invalid)
        .map(|sample| sample.steps as u32)
        .sum();

    debug!(
        "Read {} minute records for {}..{}: {} steps",
        buf.len(),
        start,
        end,
        steps
    );

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHistory<'a> {
        accessible: bool,
        samples: &'a [MinuteSample],
    }

    impl MinuteHistory for FixedHistory<'_> {
        fn metric_accessible(&self, _start: Timestamp, _end: Timestamp) -> bool {
            self.accessible
        }

        fn minute_history(&mut self, buf: &mut MinuteBuffer, _start: Timestamp, _end: Timestamp) {
            for sample in self.samples {
                if buf.push(*sample).is_err() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_sums_valid_minutes_only() {
        let mut provider = FixedHistory {
            accessible: true,
            samples: &[
                MinuteSample::valid(10),
                MinuteSample::invalid(),
                MinuteSample::valid(25),
                MinuteSample {
                    steps: 500,
                    is_invalid: true,
                },
            ],
        };
        assert_eq!(query_range(&mut provider, 0, 3_600), Ok(35));
    }

    #[test]
    fn test_unavailable_range() {
        let mut provider = FixedHistory {
            accessible: false,
            samples: &[MinuteSample::valid(10)],
        };
        assert_eq!(
            query_range(&mut provider, 100, 200),
            Err(TrackerError::DataUnavailable {
                start: 100,
                end: 200
            })
        );
    }

    #[test]
    fn test_empty_history_is_zero() {
        let mut provider = FixedHistory {
            accessible: true,
            samples: &[],
        };
        assert_eq!(query_range(&mut provider, 0, 60), Ok(0));
    }
}
