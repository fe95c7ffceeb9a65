// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Pending-request table: correlates RPC replies with the continuation
//! that dispatched them.
//!
//! A `DashMap<CorrelationId, mpsc::Sender<..>>` keyed by a monotonic
//! `AtomicU64` counter rather than storing raw closures. `Hop`/`End`
//! become channel events instead of direct callback invocations, which
//! keeps the table `Send`/`Sync` without boxing continuations.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::error::ReportCode;

/// One event delivered to the continuation of a dispatched RPC.
#[derive(Debug)]
pub enum PendingEvent {
    /// A reply matching this correlation Id arrived. Iterative RPCs
    /// (`Query`, `Route`, `Keys`) may see several of these, in
    /// wire-arrival order, before `End`.
    Hop(Bytes),
    /// Terminal delivery; the entry is already removed from the table by
    /// the time this is observed.
    End(ReportCode),
}

struct Entry {
    deadline: Instant,
    tx: mpsc::UnboundedSender<PendingEvent>,
}

/// Correlates dispatched RPCs with their continuations and enforces
/// end-to-end deadlines.
pub struct PendingTable {
    entries: DashMap<u64, Entry>,
    next_id: AtomicU64,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a new RPC dispatch, returning its correlation Id and the
    /// receiving half of its event channel. `deadline` is end-to-end: the
    /// table synthesizes `End(Timeout)` itself if it elapses first.
    pub fn dispatch(&self, deadline: Duration) -> (u64, mpsc::UnboundedReceiver<PendingEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.entries.insert(id, Entry {
            deadline: Instant::now() + deadline,
            tx,
        });
        (id, rx)
    }

    /// Delivers an inbound reply matching `id`. A reply for an unknown or
    /// already-terminated Id (late arrival after timeout/End) is silently
    /// dropped — a subsequent late call is a no-op.
    pub fn hop(&self, id: u64, payload: Bytes) {
        if let Some(entry) = self.entries.get(&id) {
            let _ = entry.tx.send(PendingEvent::Hop(payload));
        }
    }

    /// The sole success-path cleanup: removes the entry and delivers
    /// exactly one terminal event. Idempotent — ending an Id twice (or an
    /// Id already reaped by `sweep_expired`) is a no-op.
    pub fn end(&self, id: u64, report: ReportCode) {
        if let Some((_, entry)) = self.entries.remove(&id) {
            let _ = entry.tx.send(PendingEvent::End(report));
        }
    }

    /// Removes and terminates every entry whose deadline has passed,
    /// synthesizing `End(Timeout)` for each. Called once per event-loop
    /// wake alongside the connection-timeout sweep, both driven off the
    /// same min-heap.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let expired: Vec<u64> = self
            .entries
            .iter()
            .filter(|kv| kv.value().deadline <= now)
            .map(|kv| *kv.key())
            .collect();
        for id in &expired {
            self.end(*id, ReportCode::Timeout);
        }
        expired.len()
    }

    /// Terminates every still-live entry with `Cancelled`, e.g. on
    /// connection teardown or shutdown.
    pub fn cancel_all(&self, report: ReportCode) {
        let ids: Vec<u64> = self.entries.iter().map(|kv| *kv.key()).collect();
        for id in ids {
            self.end(id, report);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The earliest deadline among live entries, used by the event loop
    /// to size its next blocking wait.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|kv| kv.value().deadline).min()
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hop_then_end_delivers_in_order_and_removes_entry() {
        let table = PendingTable::new();
        let (id, mut rx) = table.dispatch(Duration::from_secs(5));
        table.hop(id, Bytes::from_static(b"first"));
        table.hop(id, Bytes::from_static(b"second"));
        table.end(id, ReportCode::Normal);

        match rx.recv().await.expect("hop delivered") {
            PendingEvent::Hop(b) => assert_eq!(&b[..], b"first"),
            PendingEvent::End(_) => panic!("expected hop"),
        }
        match rx.recv().await.expect("hop delivered") {
            PendingEvent::Hop(b) => assert_eq!(&b[..], b"second"),
            PendingEvent::End(_) => panic!("expected hop"),
        }
        match rx.recv().await.expect("end delivered") {
            PendingEvent::End(code) => assert_eq!(code, ReportCode::Normal),
            PendingEvent::Hop(_) => panic!("expected end"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn late_end_after_removal_is_a_no_op() {
        let table = PendingTable::new();
        let (id, _rx) = table.dispatch(Duration::from_secs(5));
        table.end(id, ReportCode::Normal);
        assert_eq!(table.len(), 0);
        table.end(id, ReportCode::Cancelled);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn sweep_expired_only_removes_entries_past_their_deadline() {
        let table = PendingTable::new();
        let (expired_id, _rx1) = table.dispatch(Duration::from_secs(0));
        let (live_id, _rx2) = table.dispatch(Duration::from_secs(60));

        std::thread::sleep(Duration::from_millis(5));
        let removed = table.sweep_expired(Instant::now());

        assert_eq!(removed, 1);
        assert_eq!(table.len(), 1);
        assert!(table.entries.get(&live_id).is_some());
        assert!(table.entries.get(&expired_id).is_none());
    }

    #[test]
    fn correlation_ids_are_monotonic_and_unique() {
        let table = PendingTable::new();
        let mut ids = Vec::new();
        for _ in 0..100 {
            let (id, _rx) = table.dispatch(Duration::from_secs(5));
            ids.push(id);
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert_eq!(ids, sorted);
    }
}
