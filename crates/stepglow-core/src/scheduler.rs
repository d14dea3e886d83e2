//! Deferred work for the tracker.
//!
//! The tracker never blocks or loops over many hours in one go. Instead it
//! hands [`Task`] values to a [`Scheduler`] and returns; the host event loop
//! runs each task when it comes due. [`TaskQueue`] is a fixed-capacity
//! scheduler for hosts that drive their own loop (the simulator, tests).

use embassy_time::{Duration, Instant};
use heapless::Vec;
use log::warn;

/// Work the tracker asks to be called back for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Reconstruct the next historical hour
    BackfillStep,
    /// Refresh the current hour and check for rollover
    Tick,
}

/// Timer collaborator.
pub trait Scheduler {
    /// Run `task` once after `delay`.
    ///
    /// Returns `false` when the task could not be queued.
    fn schedule_once(&mut self, delay: Duration, task: Task) -> bool;

    /// Run `task` every `interval` until the process exits.
    ///
    /// Returns `false` when the subscription could not be stored.
    fn subscribe_periodic(&mut self, interval: Duration, task: Task) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: Instant,
    task: Task,
    period: Option<Duration>,
}

/// Fixed-capacity timer queue.
///
/// Time only moves when the host calls [`TaskQueue::pop_due`], so a queue can
/// be driven from a real clock or stepped by hand.
pub struct TaskQueue<const N: usize> {
    entries: Vec<Entry, N>,
    now: Instant,
}

impl<const N: usize> Default for TaskQueue<N> {
    fn default() -> Self {
        Self::new(Instant::from_ticks(0))
    }
}

impl<const N: usize> TaskQueue<N> {
    pub const fn new(now: Instant) -> Self {
        Self {
            entries: Vec::new(),
            now,
        }
    }

    /// Time the queue was last advanced to.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a one-shot `task` is waiting.
    pub fn has_pending_once(&self, task: Task) -> bool {
        self.entries
            .iter()
            .any(|e| e.task == task && e.period.is_none())
    }

    /// Earliest deadline in the queue.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Advance to `now` and take the earliest task that is due.
    ///
    /// Tasks with equal deadlines come out in the order they were scheduled.
    /// Periodic tasks are re-armed for their next period.
    pub fn pop_due(&mut self, now: Instant) -> Option<Task> {
        if now > self.now {
            self.now = now;
        }

        let mut earliest: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.due > self.now {
                continue;
            }
            match earliest {
                Some(j) if self.entries[j].due <= entry.due => {}
                _ => earliest = Some(i),
            }
        }

        let index = earliest?;
        let entry = self.entries[index];

        match entry.period {
            Some(period) if period.as_ticks() > 0 => {
                let mut due = entry.due + period;
                while due <= self.now {
                    due = due + period;
                }
                self.entries[index].due = due;
            }
            _ => {
                self.entries.remove(index);
            }
        }

        Some(entry.task)
    }

    fn push(&mut self, entry: Entry) -> bool {
        if self.entries.push(entry).is_err() {
            warn!("Task queue full, dropping {:?}", entry.task);
            return false;
        }
        true
    }
}

impl<const N: usize> Scheduler for TaskQueue<N> {
    fn schedule_once(&mut self, delay: Duration, task: Task) -> bool {
        self.push(Entry {
            due: self.now + delay,
            task,
            period: None,
        })
    }

    fn subscribe_periodic(&mut self, interval: Duration, task: Task) -> bool {
        self.push(Entry {
            due: self.now + interval,
            task,
            period: Some(interval),
        })
    }
}
