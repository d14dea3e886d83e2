//! Repaint notification towards the display collaborator.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

/// Receives a notification whenever bucket contents change.
pub trait RepaintNotifier {
    fn mark_dirty(&self);
}

impl<R: RepaintNotifier + ?Sized> RepaintNotifier for &R {
    fn mark_dirty(&self) {
        (**self).mark_dirty()
    }
}

/// A render task can `wait()` on the signal; repeated marks coalesce.
impl<M: RawMutex> RepaintNotifier for Signal<M, ()> {
    fn mark_dirty(&self) {
        self.signal(());
    }
}

/// Simple dirty flag for single-threaded hosts.
#[derive(Debug, Default)]
pub struct DirtyFlag {
    dirty: Cell<bool>,
}

impl DirtyFlag {
    pub const fn new() -> Self {
        Self {
            dirty: Cell::new(false),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl RepaintNotifier for DirtyFlag {
    fn mark_dirty(&self) {
        self.dirty.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flag_take() {
        let flag = DirtyFlag::new();
        assert!(!flag.take());
        flag.mark_dirty();
        flag.mark_dirty();
        assert!(flag.is_dirty());
        assert!(flag.take());
        assert!(!flag.is_dirty());
    }

    #[test]
    fn test_signal_notifier() {
        use embassy_sync::blocking_mutex::raw::NoopRawMutex;

        let signal: Signal<NoopRawMutex, ()> = Signal::new();
        assert!(!signal.signaled());
        signal.mark_dirty();
        assert!(signal.signaled());
        assert_eq!(signal.try_take(), Some(()));
    }
}
