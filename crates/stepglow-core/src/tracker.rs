//! Backfill and steady-state update engine.
//!
//! [`StepTracker`] owns the day anchor, the bucket table and the backfill
//! cursor. It runs in two phases:
//!
//! 1. **Backfill** - when tracking starts after the window has opened, the
//!    elapsed hours are read back one per [`Task::BackfillStep`], with a short
//!    delay between steps so the host stays responsive.
//! 2. **Steady state** - every [`Task::Tick`] re-reads the current hour and
//!    checks whether the day has rolled over.
//!
//! Nothing here blocks; each call does a bounded amount of work and hands any
//! follow-up to the [`Scheduler`].

use embassy_time::Duration;
use log::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::display::RepaintNotifier;
use crate::error::TrackerError;
use crate::health::{MinuteHistory, query_range};
use crate::intensity::IntensityScale;
use crate::scheduler::{Scheduler, Task};
use crate::storage::{BucketTable, DayWindow};
use crate::time::{Clock, SECONDS_PER_HOUR, Timestamp};

/// Progress of the historical backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializationCursor {
    next_hour_index: usize,
    completed: bool,
}

impl InitializationCursor {
    /// Cursor with nothing left to reconstruct.
    pub const fn completed() -> Self {
        Self {
            next_hour_index: 0,
            completed: true,
        }
    }

    /// Cursor for tracking that starts at `now` on `day`.
    ///
    /// History only needs reconstructing once the window start hour has passed.
    pub fn for_start(now: Timestamp, day: &DayWindow, config: &TrackerConfig) -> Self {
        let window_start = config.window_start_hour as usize;
        if now > day.hour_start(window_start) {
            Self {
                next_hour_index: window_start,
                completed: false,
            }
        } else {
            Self::completed()
        }
    }

    pub const fn next_hour_index(&self) -> usize {
        self.next_hour_index
    }

    pub const fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Result of a single backfill step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillProgress {
    /// An hour was stored and another step has been scheduled
    Continuing { hour: usize, steps: u32 },
    /// The final hour was stored
    Finished { hour: usize, steps: u32 },
    /// The cursor was already complete; nothing was read
    Idle,
}

/// Hourly step tracker for a single day.
pub struct StepTracker<C, P, N>
where
    C: Clock,
    P: MinuteHistory,
    N: RepaintNotifier,
{
    config: TrackerConfig,
    hourly: IntensityScale,
    daily: IntensityScale,
    clock: C,
    provider: P,
    notifier: N,
    day: DayWindow,
    buckets: BucketTable,
    cursor: InitializationCursor,
    backfill_scheduled: bool,
    subscribed: bool,
}

impl<C, P, N> StepTracker<C, P, N>
where
    C: Clock,
    P: MinuteHistory,
    N: RepaintNotifier,
{
    /// Create a tracker anchored to the current day with an empty table.
    ///
    /// No history is read until [`StepTracker::start`] is called.
    pub fn new(
        config: TrackerConfig,
        clock: C,
        provider: P,
        notifier: N,
    ) -> Result<Self, TrackerError> {
        config.validate()?;

        let day = DayWindow::new(clock.start_of_day(clock.now()));

        Ok(Self {
            hourly: IntensityScale::hourly(&config),
            daily: IntensityScale::daily(&config),
            config,
            clock,
            provider,
            notifier,
            day,
            buckets: BucketTable::new(),
            cursor: InitializationCursor::completed(),
            backfill_scheduled: false,
            subscribed: false,
        })
    }

    /// Begin tracking.
    ///
    /// Re-anchors to today, clears the table, schedules the backfill when the
    /// window has already opened, subscribes to the periodic tick and runs one
    /// tick straight away. Calling it again restarts tracking for the day.
    pub fn start<S: Scheduler>(&mut self, scheduler: &mut S) {
        let now = self.clock.now();
        self.day = DayWindow::new(self.clock.start_of_day(now));
        self.buckets.reset();
        self.cursor = InitializationCursor::for_start(now, &self.day, &self.config);

        if self.cursor.is_completed() {
            info!("Tracking day from {}, nothing to backfill", self.day.start_of_day);
        } else {
            info!(
                "Tracking day from {}, backfilling from hour {}",
                self.day.start_of_day,
                self.cursor.next_hour_index()
            );
            self.schedule_backfill(scheduler, self.config.backfill_start_delay());
        }

        if !self.subscribed {
            self.subscribed =
                scheduler.subscribe_periodic(self.config.tick_interval(), Task::Tick);
        }

        self.notifier.mark_dirty();
        self.tick(scheduler);
    }

    /// Run a task previously handed to the scheduler.
    pub fn run<S: Scheduler>(&mut self, task: Task, scheduler: &mut S) {
        match task {
            Task::BackfillStep => {
                self.backfill_step(scheduler);
            }
            Task::Tick => self.tick(scheduler),
        }
    }

    /// Reconstruct the next historical hour.
    ///
    /// Stores the hour at the cursor, advances it, and schedules exactly one
    /// more step unless the hour just read was the last one.
    pub fn backfill_step<S: Scheduler>(&mut self, scheduler: &mut S) -> BackfillProgress {
        self.backfill_scheduled = false;

        if self.cursor.completed {
            debug!("Backfill step with nothing left to do");
            return BackfillProgress::Idle;
        }

        let hour = self.cursor.next_hour_index;
        let start = self.day.hour_start(hour);
        let mut end = start + SECONDS_PER_HOUR;
        let now = self.clock.now();

        if end > now {
            end = now.max(start);
            self.cursor.completed = true;
        }

        let steps = self.read_steps(start, end);
        self.buckets.set(hour, steps);
        self.cursor.next_hour_index += 1;

        if self.cursor.next_hour_index >= self.config.window_end_hour() as usize {
            self.cursor.completed = true;
        }

        self.notifier.mark_dirty();

        if self.cursor.completed {
            info!(
                "Backfill finished at hour {} ({} steps today)",
                hour,
                self.buckets.total()
            );
            BackfillProgress::Finished { hour, steps }
        } else {
            debug!("Backfilled hour {}: {} steps", hour, steps);
            self.schedule_backfill(scheduler, self.config.backfill_step_delay());
            BackfillProgress::Continuing { hour, steps }
        }
    }

    /// Steady-state update, run once per minute.
    ///
    /// Handles rollover first, then refreshes the current hour's bucket once
    /// backfill has finished. While backfill is unfinished and the scheduler
    /// holds no step for it, the tick runs one step itself.
    pub fn tick<S: Scheduler>(&mut self, scheduler: &mut S) {
        let now = self.clock.now();
        self.check_rollover(now, scheduler);

        if !self.cursor.completed {
            if !self.backfill_scheduled {
                warn!("No backfill step pending, continuing from the tick");
                self.backfill_step(scheduler);
            }
            return;
        }

        let hour = self.day.hour_index_of(now);
        if !self.config.in_window(hour) {
            return;
        }

        let hour_start = self.day.hour_start(hour);
        let steps = self.read_steps(hour_start, now);

        if self.buckets.get(hour) != steps {
            debug!("Hour {} now at {} steps", hour, steps);
            self.buckets.set(hour, steps);
            self.notifier.mark_dirty();
        }
    }

    /// Reset the table when `now` belongs to a different day than the anchor.
    fn check_rollover<S: Scheduler>(&mut self, now: Timestamp, scheduler: &mut S) {
        let start_of_day = self.clock.start_of_day(now);
        if start_of_day == self.day.start_of_day {
            return;
        }

        info!(
            "New day detected ({} -> {}), clearing {} steps",
            self.day.start_of_day,
            start_of_day,
            self.buckets.total()
        );

        self.day = DayWindow::new(start_of_day);
        self.buckets.reset();
        self.cursor = InitializationCursor::for_start(now, &self.day, &self.config);
        self.notifier.mark_dirty();

        if !self.cursor.completed {
            self.schedule_backfill(scheduler, self.config.backfill_step_delay());
        }
    }

    fn schedule_backfill<S: Scheduler>(&mut self, scheduler: &mut S, delay: Duration) {
        if self.backfill_scheduled {
            return;
        }
        self.backfill_scheduled = scheduler.schedule_once(delay, Task::BackfillStep);
    }

    /// Steps in `[start, end)`, or zero when the provider has nothing.
    fn read_steps(&mut self, start: Timestamp, end: Timestamp) -> u32 {
        match query_range(&mut self.provider, start, end) {
            Ok(steps) => steps,
            Err(err) => {
                debug!("{}, storing 0", err);
                0
            }
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn day(&self) -> DayWindow {
        self.day
    }

    pub fn buckets(&self) -> &BucketTable {
        &self.buckets
    }

    pub fn cursor(&self) -> InitializationCursor {
        self.cursor
    }

    pub fn is_backfilled(&self) -> bool {
        self.cursor.completed
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Intensity level of `hour`.
    pub fn level(&self, hour: usize) -> u8 {
        self.hourly.level(self.buckets.get(hour))
    }

    /// `(hour, level)` for each hour of the active window, in order.
    pub fn levels(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        let start = self.config.window_start_hour as usize;
        let end = self.config.window_end_hour() as usize;
        (start..end).map(move |hour| (hour, self.level(hour)))
    }

    /// Steps recorded so far today.
    pub fn daily_total(&self) -> u32 {
        self.buckets.total()
    }

    /// Today's total quantized against the daily goal.
    pub fn daily_level(&self) -> u8 {
        self.daily.level(self.daily_total())
    }
}
