// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `TimeoutHeap`: a min-heap of `(Deadline, handle)`.
//!
//! `Reschedual` doesn't hunt through the heap for the entry to update —
//! it pushes a fresh `(newDeadline, handle, generation)` and bumps the
//! entry's generation. A popped heap record is honored only if its
//! generation still matches the live entry's; anything else is a stale
//! ghost from a prior schedule and is silently discarded. This keeps
//! `Reschedual` O(log n) instead of O(n).

use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    time::Instant,
};

use crate::eventloop::Handle;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct HeapRecord {
    deadline: Instant,
    handle: Handle,
    generation: u64,
}

impl Ord for HeapRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline.cmp(&other.deadline)
    }
}

impl PartialOrd for HeapRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
pub struct TimeoutHeap {
    heap: BinaryHeap<Reverse<HeapRecord>>,
}

impl TimeoutHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, deadline: Instant, handle: Handle, generation: u64) {
        self.heap.push(Reverse(HeapRecord { deadline, handle, generation }));
    }

    /// Returns the soonest deadline among records that have not yet been
    /// popped, including stale ones — callers use this only to size a
    /// wait, so an occasional stale deadline costs one extra wakeup, not
    /// correctness.
    pub fn peek_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|r| r.0.deadline)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pops every record whose deadline is `<= now`, passing each to
    /// `current_generation` to check staleness; only records still
    /// matching their entry's live generation are yielded.
    pub fn drain_expired(
        &mut self,
        now: Instant,
        current_generation: impl Fn(Handle) -> Option<u64>,
    ) -> Vec<Handle> {
        let mut fired = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek() {
            if top.deadline > now {
                break;
            }
            let record = self.heap.pop().expect("just peeked").0;
            if current_generation(record.handle) == Some(record.generation) {
                fired.push(record.handle);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut heap = TimeoutHeap::new();
        let now = Instant::now();
        heap.push(now + Duration::from_secs(3), 3, 0);
        heap.push(now + Duration::from_secs(1), 1, 0);
        heap.push(now + Duration::from_secs(2), 2, 0);

        let fired = heap.drain_expired(now + Duration::from_secs(10), |_| Some(0));
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut heap = TimeoutHeap::new();
        let now = Instant::now();
        heap.push(now, 1, 0); // superseded by a reschedule bumping the generation
        heap.push(now, 1, 1);

        let fired = heap.drain_expired(now, |h| if h == 1 { Some(1) } else { None });
        assert_eq!(fired, vec![1]);
    }

    #[test]
    fn only_expired_records_are_drained() {
        let mut heap = TimeoutHeap::new();
        let now = Instant::now();
        heap.push(now + Duration::from_secs(5), 1, 0);
        let fired = heap.drain_expired(now, |_| Some(0));
        assert!(fired.is_empty());
        assert!(!heap.is_empty());
    }
}
