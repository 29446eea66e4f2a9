//! Deferred actions keyed to the simulation clock.
//!
//! Timed effects live in a min-heap of `(fire_at, payload)` entries drained
//! on each tick; there are no timers or threads. Entries scheduled for the
//! same instant fire in insertion order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Entry<T> {
    fire_at: Duration,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of deferred payloads ordered by fire time.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    seq: u64,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }
}

impl<T> DeferredQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a payload to fire once the clock reaches `fire_at`.
    pub fn schedule(&mut self, fire_at: Duration, payload: T) {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        self.heap.push(Reverse(Entry {
            fire_at,
            seq,
            payload,
        }));
    }

    /// Pops every payload whose fire time is due at `now` into `out`.
    pub fn drain_due(&mut self, now: Duration, out: &mut Vec<T>) {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.fire_at > now {
                break;
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            out.push(entry.payload);
        }
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Reports whether no entry is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every pending entry; used between levels.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_time_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_secs(3), "late");
        queue.schedule(Duration::from_secs(1), "early");
        queue.schedule(Duration::from_secs(2), "middle");

        let mut due = Vec::new();
        queue.drain_due(Duration::from_secs(3), &mut due);
        assert_eq!(due, vec!["early", "middle", "late"]);
    }

    #[test]
    fn holds_entries_that_are_not_due() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_secs(5), "later");

        let mut due = Vec::new();
        queue.drain_due(Duration::from_secs(4), &mut due);
        assert!(due.is_empty());
        assert_eq!(queue.len(), 1);

        queue.drain_due(Duration::from_secs(5), &mut due);
        assert_eq!(due, vec!["later"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn simultaneous_entries_fire_in_insertion_order() {
        let mut queue = DeferredQueue::new();
        let at = Duration::from_millis(500);
        queue.schedule(at, 1);
        queue.schedule(at, 2);
        queue.schedule(at, 3);

        let mut due = Vec::new();
        queue.drain_due(at, &mut due);
        assert_eq!(due, vec![1, 2, 3]);
    }
}
