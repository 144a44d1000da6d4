//! Logical clock and cancelable scheduled continuations
//!
//! Every wait in a match (round delays, victory celebration, allocation
//! gating) is a scheduler entry keyed to the tick clock. Nothing sleeps.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Monotonic tick counter with a fixed tick rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    tick: Tick,
    tick_rate: u32,
}

impl SimClock {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick: 0,
            tick_rate: tick_rate.max(1),
        }
    }

    pub fn now(&self) -> Tick {
        self.tick
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Advance by one tick and return the new time
    pub fn advance(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    /// Elapsed match time in seconds
    pub fn seconds(&self) -> f32 {
        self.tick as f32 / self.tick_rate as f32
    }

    pub fn ticks_for(&self, seconds: f32) -> Tick {
        (seconds.max(0.0) * self.tick_rate as f32).round() as Tick
    }
}

/// Handle returned for every scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(u64);

/// Pending continuations ordered by due tick, then by scheduling order
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    queue: BTreeMap<(Tick, u64), (TaskHandle, T)>,
    index: AHashMap<TaskHandle, (Tick, u64)>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            index: AHashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run at absolute tick `due`
    pub fn schedule_at(&mut self, due: Tick, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TaskHandle(seq);
        self.queue.insert((due, seq), (handle, task));
        self.index.insert(handle, (due, seq));
        handle
    }

    /// Schedule `task` to run `delay` ticks after `now`
    pub fn schedule_after(&mut self, now: Tick, delay: Tick, task: T) -> TaskHandle {
        self.schedule_at(now + delay, task)
    }

    /// Cancel a pending entry. Returns the task if it had not fired yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let key = self.index.remove(&handle)?;
        self.queue.remove(&key).map(|(_, task)| task)
    }

    /// Drop every pending entry
    pub fn cancel_all(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.index.clear();
        count
    }

    /// Remove and return every entry due at or before `now`, in firing order
    pub fn drain_due(&mut self, now: Tick) -> Vec<(TaskHandle, T)> {
        let later = self.queue.split_off(&(now + 1, 0));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values()
            .inspect(|(handle, _)| {
                self.index.remove(handle);
            })
            .collect()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate pending tasks in firing order
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.queue.values().map(|(_, task)| task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_and_converts() {
        let mut clock = SimClock::new(30);
        assert_eq!(clock.now(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now(), 2);
        assert_eq!(clock.ticks_for(0.5), 15);
        assert!((clock.seconds() - 2.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_drain_due_respects_due_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(5, "late");
        scheduler.schedule_at(3, "first");
        scheduler.schedule_at(3, "second");
        scheduler.schedule_at(9, "future");

        let fired: Vec<_> = scheduler.drain_due(5).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["first", "second", "late"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule_after(0, 2, 1);
        let drop = scheduler.schedule_after(0, 2, 2);

        assert_eq!(scheduler.cancel(drop), Some(2));
        assert_eq!(scheduler.cancel(drop), None);
        assert!(scheduler.is_pending(keep));

        let fired: Vec<_> = scheduler.drain_due(10).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec![1]);
        assert!(!scheduler.is_pending(keep));
    }

    #[test]
    fn test_cancel_all_clears_everything() {
        let mut scheduler = Scheduler::new();
        for i in 0..4 {
            scheduler.schedule_after(0, i, i);
        }
        assert_eq!(scheduler.cancel_all(), 4);
        assert!(scheduler.drain_due(100).is_empty());
    }
}
