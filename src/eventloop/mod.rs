// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Single-threaded cooperative event loop.
//!
//! Built on tokio's reactor rather than a hand-rolled epoll/kqueue
//! wrapper: `tokio::net::TcpStream::readable()`/`writable()` already is
//! the readiness primitive every entry waits on, layered with a deadline
//! the same way `io_with_timeout` layers one over a plain tokio future.
//! Entries, the timeout heap, and shared storage are realized literally:
//! a `HashMap` keyed by a monotonic [`Handle`], a [`heap::TimeoutHeap`],
//! and a generic `S` threaded through every callback as an explicit
//! context parameter rather than a thread-local.

pub mod heap;

use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};

use tokio::{net::TcpStream, task::JoinSet};

use heap::TimeoutHeap;

pub type Handle = u64;

/// Readiness interest for an entry's underlying stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
    Both,
}

/// Per-entry readiness/timeout callback. Implementations live in
/// `http::handler` (HTTP/1.x connections) and `rpc` (DHT peer
/// connections); both are driven by the same loop instance and the same
/// `Storage` value.
pub trait EntryHandler<S>: Send {
    /// The readiness primitive fired for this entry's interest mask.
    fn on_ready(&mut self, handle: Handle, readable: bool, writable: bool, storage: &mut S);

    /// This entry's deadline elapsed before it was rescheduled. For
    /// connection handlers this means forced removal; for other uses
    /// (periodic maintenance) it means "run the task, then reschedule
    /// yourself".
    fn on_timeout(&mut self, handle: Handle, storage: &mut S);

    /// Polled once after every `on_ready`/`on_timeout` invocation. A
    /// connection handler that has gone to `ShouldClose` with an empty
    /// egress queue returns `true` here instead of reaching back into the
    /// loop to remove itself mid-callback.
    fn should_remove(&self) -> bool {
        false
    }

    /// Polled once after every `on_ready`/`on_timeout` invocation that
    /// doesn't remove the entry, so the loop can re-arm readiness without
    /// the handler reaching back into it mid-callback (e.g. once a
    /// response is queued, the connection needs `Writable` on top of
    /// whatever it already had).
    fn interest(&self) -> Interest {
        Interest::Readable
    }
}

struct EntryRecord<S> {
    stream: Option<Arc<TcpStream>>,
    interest: Interest,
    generation: u64,
    handler: Box<dyn EntryHandler<S>>,
}

/// The timed, readiness-multiplexed event loop.
pub struct EventLoop<S> {
    entries: HashMap<Handle, EntryRecord<S>>,
    heap: TimeoutHeap,
    next_handle: Handle,
    storage: S,
}

impl<S> EventLoop<S> {
    pub fn new(storage: S) -> Self {
        Self {
            entries: HashMap::new(),
            heap: TimeoutHeap::new(),
            next_handle: 1,
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Registers `stream` (or a timer-only entry, if `None`) with initial
    /// `interest`, inserting it into the heap at `now + timeout`.
    pub fn add(
        &mut self,
        stream: Option<Arc<TcpStream>>,
        interest: Interest,
        timeout: Duration,
        handler: Box<dyn EntryHandler<S>>,
    ) -> Handle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(handle, EntryRecord {
            stream,
            interest,
            generation: 0,
            handler,
        });
        self.heap.push(Instant::now() + timeout, handle, 0);
        handle
    }

    /// Updates readiness interest without disturbing the deadline.
    pub fn modify(&mut self, handle: Handle, interest: Interest) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.interest = interest;
        }
    }

    /// Sets `deadline = now + newTimeout` and reschedules within the heap
    /// (the superseded heap record is left in place; it will be
    /// discarded at pop time by generation mismatch).
    pub fn reschedule(&mut self, handle: Handle, new_timeout: Duration) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.generation += 1;
            self.heap.push(Instant::now() + new_timeout, handle, entry.generation);
        }
    }

    /// Removes the entry. Idempotent: removing an already-removed handle
    /// (e.g. from callback re-entry) is a no-op and disturbs nothing
    /// else.
    pub fn remove(&mut self, handle: Handle) {
        self.entries.remove(&handle);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blocks on the readiness primitive with a timeout equal to the
    /// earliest heap deadline minus now, dispatches every entry that
    /// became ready, then drains expired deadlines and invokes their
    /// timeout path. Returns once there are no entries and no pending
    /// deadlines left (an empty loop has nothing left to run).
    pub async fn run(&mut self) {
        while !self.entries.is_empty() || !self.heap.is_empty() {
            self.turn().await;
        }
    }

    /// One iteration of [`EventLoop::run`], exposed separately so callers
    /// (and tests) can drive the loop deterministically.
    pub async fn turn(&mut self) {
        let mut joinset: JoinSet<(Handle, bool, bool)> = JoinSet::new();
        for (&handle, entry) in self.entries.iter() {
            let Some(stream) = entry.stream.clone() else { continue };
            let interest = entry.interest;
            joinset.spawn(async move {
                match interest {
                    Interest::Readable => {
                        let _ = stream.readable().await;
                        (handle, true, false)
                    },
                    Interest::Writable => {
                        let _ = stream.writable().await;
                        (handle, false, true)
                    },
                    Interest::Both => {
                        tokio::select! {
                            r = stream.readable() => { let _ = r; (handle, true, false) }
                            w = stream.writable() => { let _ = w; (handle, false, true) }
                        }
                    },
                }
            });
        }

        let deadline = self
            .heap
            .peek_deadline()
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        let mut finished = None;
        tokio::select! {
            Some(Ok((handle, readable, writable))) = joinset.join_next(), if !joinset.is_empty() => {
                joinset.abort_all();
                if let Some(entry) = self.entries.get_mut(&handle) {
                    entry.handler.on_ready(handle, readable, writable, &mut self.storage);
                    if entry.handler.should_remove() {
                        finished = Some(handle);
                    } else {
                        entry.interest = entry.handler.interest();
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline.into()) => {
                joinset.abort_all();
            }
        }
        if let Some(handle) = finished {
            self.remove(handle);
        }

        self.sweep_timeouts();
    }

    fn sweep_timeouts(&mut self) {
        let now = Instant::now();
        let generations: HashMap<Handle, u64> =
            self.entries.iter().map(|(&h, e)| (h, e.generation)).collect();
        let fired = self.heap.drain_expired(now, |h| generations.get(&h).copied());
        let mut to_remove = Vec::new();
        for handle in fired {
            if let Some(entry) = self.entries.get_mut(&handle) {
                entry.handler.on_timeout(handle, &mut self.storage);
                if entry.handler.should_remove() {
                    to_remove.push(handle);
                } else {
                    entry.interest = entry.handler.interest();
                }
            }
        }
        for handle in to_remove {
            self.remove(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        ready_count: usize,
        timeout_count: usize,
    }

    impl EntryHandler<()> for CountingHandler {
        fn on_ready(&mut self, _handle: Handle, _readable: bool, _writable: bool, _storage: &mut ()) {
            self.ready_count += 1;
        }

        fn on_timeout(&mut self, _handle: Handle, _storage: &mut ()) {
            self.timeout_count += 1;
        }
    }

    #[tokio::test]
    async fn timer_only_entry_fires_timeout_and_is_removable() {
        let mut loop_ = EventLoop::new(());
        let handle = loop_.add(
            None,
            Interest::Readable,
            Duration::from_millis(1),
            Box::new(CountingHandler { ready_count: 0, timeout_count: 0 }),
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
        loop_.turn().await;
        loop_.remove(handle);
        assert!(!loop_.entries.contains_key(&handle));
    }

    #[test]
    fn removing_an_already_removed_handle_is_a_no_op() {
        let mut loop_: EventLoop<()> = EventLoop::new(());
        loop_.remove(999);
        assert_eq!(loop_.len(), 0);
    }

    #[test]
    fn modify_does_not_disturb_the_deadline() {
        let mut loop_: EventLoop<()> = EventLoop::new(());
        let handle = loop_.add(
            None,
            Interest::Readable,
            Duration::from_secs(5),
            Box::new(CountingHandler { ready_count: 0, timeout_count: 0 }),
        );
        loop_.modify(handle, Interest::Writable);
        assert_eq!(loop_.entries.get(&handle).expect("present").interest, Interest::Writable);
    }
}
