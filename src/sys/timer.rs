use std::cmp::Reverse;
use std::collections::BinaryHeap;

use slotmap::{SlotMap, new_key_type};
use tracing::trace;

new_key_type! { pub struct TimerId; }

struct Timer<A> {
    deadline: u64,
    interval: Option<u64>,
    action: A,
}

/// Timers for a single-threaded event loop driven by a virtual millisecond
/// clock. Timers fire in deadline order, ties in scheduling order.
///
/// Cancelling only removes the timer from the arena; its heap entry is
/// skipped when it surfaces.
pub struct Scheduler<A> {
    now: u64,
    seq: u64,
    timers: SlotMap<TimerId, Timer<A>>,
    queue: BinaryHeap<Reverse<(u64, u64, TimerId)>>,
}

impl<A: Clone> Default for Scheduler<A> {
    fn default() -> Self { Self::new() }
}

impl<A: Clone> Scheduler<A> {
    pub fn new() -> Self {
        Scheduler {
            now: 0,
            seq: 0,
            timers: SlotMap::default(),
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> u64 { self.now }

    /// Fires once, `delay` milliseconds from now.
    pub fn schedule(&mut self, delay: u32, action: A) -> TimerId { self.insert(delay, None, action) }

    /// Fires every `interval` milliseconds until cancelled.
    pub fn schedule_repeating(&mut self, interval: u32, action: A) -> TimerId {
        let interval = interval.max(1);
        self.insert(interval, Some(u64::from(interval)), action)
    }

    fn insert(&mut self, delay: u32, interval: Option<u64>, action: A) -> TimerId {
        let deadline = self.now + u64::from(delay);
        let id = self.timers.insert(Timer { deadline, interval, action });
        self.push(deadline, id);
        trace!(?id, deadline, ?interval, "Scheduled timer");
        id
    }

    fn push(&mut self, deadline: u64, id: TimerId) {
        self.seq += 1;
        self.queue.push(Reverse((deadline, self.seq, id)));
    }

    pub fn cancel(&mut self, id: TimerId) -> bool { self.timers.remove(id).is_some() }

    pub fn is_scheduled(&self, id: TimerId) -> bool { self.timers.contains_key(id) }

    pub fn next_deadline(&mut self) -> Option<u64> {
        while let Some(&Reverse((deadline, _, id))) = self.queue.peek() {
            match self.timers.get(id) {
                Some(timer) if timer.deadline == deadline => return Some(deadline),
                _ => {
                    self.queue.pop();
                }
            }
        }
        None
    }

    /// Pops the next timer due at or before `until`, moving the clock to its
    /// deadline. Repeating timers are re-armed before being returned. Once
    /// nothing is due the clock is moved to `until`.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, A)> {
        let deadline = match self.next_deadline() {
            Some(deadline) if deadline <= until => deadline,
            _ => {
                self.now = self.now.max(until);
                return None;
            }
        };
        let Reverse((_, _, id)) = self.queue.pop()?;
        self.now = self.now.max(deadline);
        let timer = self.timers.get_mut(id)?;
        let action = timer.action.clone();
        let interval = timer.interval;
        match interval {
            Some(interval) => {
                timer.deadline = deadline + interval;
                self.push(deadline + interval, id);
            }
            None => {
                self.timers.remove(id);
            }
        }
        Some((id, action))
    }

    pub fn len(&self) -> usize { self.timers.len() }

    pub fn is_empty(&self) -> bool { self.timers.is_empty() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn drain(scheduler: &mut Scheduler<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = vec![];
        while let Some((_, action)) = scheduler.pop_due(until) {
            fired.push((scheduler.now(), action));
        }
        fired
    }

    #[test]
    fn it_starts_empty_at_time_zero() {
        let mut scheduler: Scheduler<&'static str> = Scheduler::default();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.now(), 0);
        assert_eq!(scheduler.next_deadline(), None);
        scheduler.schedule(5, "tick");
        assert_eq!(drain(&mut scheduler, 5), vec![(5, "tick")]);
    }

    #[test]
    fn it_fires_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30, "late");
        scheduler.schedule(10, "early");
        scheduler.schedule(10, "early-too");
        assert_eq!(drain(&mut scheduler, 100), vec![
            (10, "early"),
            (10, "early-too"),
            (30, "late")
        ]);
        assert_eq!(scheduler.now(), 100);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn it_rearms_repeating_timers_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_repeating(40, "tick");
        assert_eq!(drain(&mut scheduler, 130), vec![(40, "tick"), (80, "tick"), (120, "tick")]);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(drain(&mut scheduler, 500), vec![]);
    }

    #[test]
    fn it_skips_cancelled_timers() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(5, "cancelled");
        scheduler.schedule(6, "kept");
        scheduler.cancel(id);
        assert_eq!(scheduler.next_deadline(), Some(6));
        assert_eq!(drain(&mut scheduler, 10), vec![(6, "kept")]);
    }
}
