//! Fixed-size storage for one day of hourly step counts.

pub mod buckets;

pub use buckets::*;

/// Number of hourly buckets kept for a day
pub const BUCKET_COUNT: usize = 24;
