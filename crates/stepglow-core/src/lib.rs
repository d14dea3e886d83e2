//! Hardware-independent core library for stepglow
//!
//! Tracks a day of hourly step counts for a watchface-style display: it
//! reconstructs the hours that elapsed before tracking started, keeps the
//! current hour fresh once a minute, clears itself at midnight, and maps each
//! hour onto a small ordinal color scale.
//!
//! It is `#![no_std]` without `alloc`; every buffer is fixed-size so it runs
//! unchanged on microcontrollers and on desktop hosts (for the simulator and
//! tests). The clock, the step history source, the timer and the display are
//! all injected.

#![no_std]

pub mod config;
pub mod display;
pub mod error;
pub mod health;
pub mod intensity;
pub mod scheduler;
pub mod storage;
pub mod time;
pub mod tracker;
pub mod ui;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use tracker::{BackfillProgress, InitializationCursor, StepTracker};
