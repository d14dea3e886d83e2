//! Error types for the step tracker

use thiserror_no_std::Error;

use crate::time::Timestamp;

/// Errors raised inside the tracker.
///
/// Only [`TrackerError::InvalidConfig`] ever reaches a caller. The other
/// variants are resolved where they occur: missing data becomes a zero bucket
/// and a stray hour index is clamped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    #[error("step data unavailable for {start}..{end}")]
    DataUnavailable { start: Timestamp, end: Timestamp },
    #[error("hour index {0} out of range")]
    IndexOutOfRange(i64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
