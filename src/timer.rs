//! Cancellable periodic tasks on a virtual clock
//!
//! The scheduler never runs callbacks itself. Owners step it with
//! `pop_due`, which hands back one due handle at a time so that a firing
//! timer can cancel another before that one gets its turn.

use std::time::Duration;

/// Shortest allowed interval period
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle returned by `set_interval`, used to cancel the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Interval {
    handle: TimerHandle,
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    intervals: Vec<Interval>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Start a periodic task; the first firing is one period from now
    pub fn set_interval(&mut self, period: Duration) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.intervals.push(Interval {
            handle,
            period,
            next_due: self.now.saturating_add(period),
        });
        log::debug!("interval {:?} started ({:?})", handle, period);
        handle
    }

    /// Cancel a task. Cancelling twice, or an unknown handle, is a no-op
    /// that returns false.
    pub fn clear_interval(&mut self, handle: TimerHandle) -> bool {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.handle != handle);
        let removed = self.intervals.len() != before;
        if removed {
            log::debug!("interval {:?} cancelled", handle);
        }
        removed
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.intervals.iter().any(|i| i.handle == handle)
    }

    pub fn active_count(&self) -> usize {
        self.intervals.len()
    }

    /// When the earliest active task is due next
    pub fn next_due(&self) -> Option<Duration> {
        self.intervals.iter().map(|i| i.next_due).min()
    }

    pub fn cancel_all(&mut self) {
        if !self.intervals.is_empty() {
            log::debug!("cancelling {} interval(s)", self.intervals.len());
        }
        self.intervals.clear();
    }

    /// Pop the earliest task due at or before `deadline`.
    ///
    /// Moves the clock to the firing time and reschedules the task for its
    /// next period. Ties fire in creation order. A task whose next firing
    /// would fall past the end of the clock fires one last time and is
    /// dropped.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<TimerHandle> {
        let (pos, next) = self
            .intervals
            .iter_mut()
            .enumerate()
            .filter(|(_, i)| i.next_due <= deadline)
            .min_by_key(|(_, i)| (i.next_due, i.handle))?;
        let handle = next.handle;
        self.now = self.now.max(next.next_due);
        match next.next_due.checked_add(next.period) {
            Some(due) => next.next_due = due,
            None => {
                log::debug!("interval {:?} ran off the clock", handle);
                self.intervals.remove(pos);
            }
        }
        Some(handle)
    }

    /// Move the clock to `deadline` once every due task has been popped
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}
