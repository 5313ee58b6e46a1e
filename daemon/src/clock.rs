/// Simulated time for the dashboard's fake transitions.
///
/// Nothing in the core reads the wall clock. A [`Scheduler`] owns a
/// [`SimClock`] and a queue of pending items; time only moves when the host
/// advances it (the daemon's tick in production, explicit steps in tests).
/// Scheduled items are fire-and-forget: there is no cancellation.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Monotonic simulated clock anchored to a wall-clock epoch.
#[derive(Debug, Clone)]
pub struct SimClock {
    epoch: DateTime<Utc>,
    elapsed: Duration,
}

impl SimClock {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            elapsed: Duration::ZERO,
        }
    }

    /// A clock whose epoch is the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Simulated time since the epoch.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Wall-clock timestamp corresponding to the current simulated instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::milliseconds(self.elapsed.as_millis() as i64)
    }

    fn set_elapsed(&mut self, elapsed: Duration) {
        // Never run backwards.
        self.elapsed = self.elapsed.max(elapsed);
    }
}

struct Pending<T> {
    due: Duration,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    /// Reversed so the max-heap pops the earliest due item first; ties break
    /// on scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Delayed-item queue driven by a [`SimClock`].
pub struct Scheduler<T> {
    clock: SimClock,
    queue: BinaryHeap<Pending<T>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Queues `item` to become due `delay` after the current simulated instant.
    pub fn schedule(&mut self, delay: Duration, item: T) {
        let due = self.clock.elapsed() + delay;
        self.queue.push(Pending {
            due,
            seq: self.next_seq,
            item,
        });
        self.next_seq += 1;
    }

    /// Pops the earliest item due at or before `deadline`, moving the clock to
    /// that item's due time. Returns `None` once nothing else is due.
    ///
    /// Callers drain this in a loop and then call [`Scheduler::settle`] so
    /// that each item observes the clock at its own due instant.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        if self.queue.peek()?.due > deadline {
            return None;
        }
        let pending = self.queue.pop()?;
        self.clock.set_elapsed(pending.due);
        Some(pending.item)
    }

    /// Moves the clock to `deadline` once every due item has been drained.
    pub fn settle(&mut self, deadline: Duration) {
        self.clock.set_elapsed(deadline);
    }

    /// Deadline `by` past the current simulated instant.
    pub fn deadline_after(&self, by: Duration) -> Duration {
        self.clock.elapsed() + by
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
