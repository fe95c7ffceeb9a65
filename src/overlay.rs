// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Chord overlay engine: finger table maintenance and routing
//! decisions. This module is pure logic — no I/O — so it can be
//! exercised directly by the ring-closure and finger-discipline property
//! tests; `rpc.rs` is what actually dispatches `FindSuccessor` across the
//! wire when a lookup can't be answered locally.

use crate::{finger::FingerTable, key::Key, node::Node};

/// The outcome of a local `FindSuccessor(k)` step: either the answer is
/// already known (`self` or the immediate successor), or the caller must
/// forward the query to another node and await its answer.
#[derive(Debug, Clone)]
pub enum RouteDecision {
    Answer(Node),
    Forward(Node),
}

/// Maintains one node's position on the ring: its own Id, predecessor,
/// and finger table (whose row 0 doubles as the successor pointer).
pub struct Overlay {
    pub self_node: Node,
    pub predecessor: Option<Node>,
    pub fingers: FingerTable,
}

impl Overlay {
    /// A brand-new ring of one: `self` is its own successor, no
    /// predecessor yet.
    pub fn solo(self_node: Node, bits: u32) -> Self {
        let mut fingers = FingerTable::new(self_node.id.clone(), bits);
        fingers.set_successor(self_node.clone());
        Self { self_node, predecessor: None, fingers }
    }

    pub fn successor(&self) -> &Node {
        self.fingers.successor().unwrap_or(&self.self_node)
    }

    /// `FindSuccessor(k)`, the purely local part: either the
    /// answer is already known, or the query must be forwarded and the
    /// caller awaits its answer over an RPC.
    pub fn find_successor_locally(&self, k: &Key) -> RouteDecision {
        let successor = self.successor().clone();
        if successor == self.self_node || k.in_half_open_interval(&self.self_node.id, &successor.id) {
            return RouteDecision::Answer(successor);
        }
        match self.closest_preceding_node(k) {
            Some(n) if n != &self.self_node => RouteDecision::Forward(n.clone()),
            _ => RouteDecision::Answer(self.self_node.clone()),
        }
    }

    /// `ClosestPrecedingNode(k)`: falls back to `self` when no
    /// finger qualifies.
    pub fn closest_preceding_node(&self, k: &Key) -> Option<&Node> {
        self.fingers.closest_preceding_node(k)
    }

    /// The local half of `Stabilize`: given the successor's
    /// reported predecessor `p`, decide whether to adopt it. The RPC
    /// dispatch (ask-successor-for-its-predecessor, then notify) lives in
    /// `rpc.rs`; this function is the pure decision so it's directly
    /// testable.
    pub fn stabilize_with_reported_predecessor(&mut self, p: Option<Node>) {
        if let Some(p) = p
            && p != self.self_node
            && p.id.in_open_interval(&self.self_node.id, &self.successor().id)
        {
            self.fingers.set_successor(p);
        }
    }

    /// `Notify(n)`: adopt `n` as predecessor if there is none, or
    /// if `n` is strictly between the current predecessor and `self`.
    pub fn notify(&mut self, n: Node) {
        if n == self.self_node {
            return;
        }
        let adopt = match &self.predecessor {
            None => true,
            Some(pred) => n.id.in_open_interval(&pred.id, &self.self_node.id),
        };
        if adopt {
            self.predecessor = Some(n);
        }
    }

    /// Advances `NextFingerToFix` and returns the row index plus the key
    /// that row's `FindSuccessor` call must resolve; the caller installs
    /// the result with [`Overlay::set_finger`].
    pub fn next_finger_to_fix(&mut self) -> (usize, Key) {
        self.fingers.advance_cursor()
    }

    pub fn set_finger(&mut self, index: usize, node: Node) {
        self.fingers.set(index, node);
    }

    /// `CheckPredecessor`: the caller determines liveness (an RPC
    /// round trip); this just clears the slot on failure.
    pub fn clear_predecessor(&mut self) {
        self.predecessor = None;
    }

    /// `Join(known)`, the local half: resets the predecessor. The
    /// caller still owes a `FindSuccessor(Self.Id)` RPC to `known` and
    /// must install its result as `Fingers[0].Node`.
    pub fn begin_join(&mut self) {
        self.predecessor = None;
    }
}
