// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Finger table. Entry `i` starts at `Self.Id + 2^i` and is overwritten
//! in place by `FixFingers`; entries are never individually destroyed.

use crate::{key::Key, node::Node};

/// One row of the finger table.
#[derive(Debug, Clone)]
pub struct FingerEntry {
    pub start: Key,
    pub node: Option<Node>,
}

/// `bits` rows, each `start = owner.id + 2^i`, plus the rotating cursor
/// `FixFingers` advances.
pub struct FingerTable {
    owner: Key,
    entries: Vec<FingerEntry>,
    next_to_fix: usize,
}

impl FingerTable {
    /// Builds an empty table (no node assigned to any row yet) for a ring
    /// of width `bits`, rooted at `owner`.
    pub fn new(owner: Key, bits: u32) -> Self {
        let entries = (0..bits)
            .map(|i| FingerEntry {
                start: owner.add_power_of_two(i),
                node: None,
            })
            .collect();
        Self {
            owner,
            entries,
            next_to_fix: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, i: usize) -> &FingerEntry {
        &self.entries[i]
    }

    /// `Fingers[0].Node`, the immediate successor — `None` only before the
    /// node has joined a ring.
    pub fn successor(&self) -> Option<&Node> {
        self.entries.first().and_then(|e| e.node.as_ref())
    }

    pub fn set_successor(&mut self, node: Node) {
        if let Some(first) = self.entries.first_mut() {
            first.node = Some(node);
        }
    }

    /// Advances the cursor (mod table length) and returns the index and
    /// start key the caller must resolve via `FindSuccessor`.
    pub fn advance_cursor(&mut self) -> (usize, Key) {
        let idx = self.next_to_fix;
        self.next_to_fix = (self.next_to_fix + 1) % self.entries.len().max(1);
        (idx, self.entries[idx].start.clone())
    }

    pub fn set(&mut self, i: usize, node: Node) {
        self.entries[i].node = Some(node);
    }

    /// `ClosestPrecedingNode(k)`: scans from the highest row down, returns
    /// the first finger whose node's Id lies in `(owner, k)`.
    /// Falls back to `None`, meaning "self".
    pub fn closest_preceding_node(&self, k: &Key) -> Option<&Node> {
        for entry in self.entries.iter().rev() {
            if let Some(node) = &entry.node
                && node.id.in_open_interval(&self.owner, k)
            {
                return Some(node);
            }
        }
        None
    }
}
