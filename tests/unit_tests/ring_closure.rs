// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Pure in-memory simulation of a fixed 6-node ring: no sockets, no
//! `Runner`, just [`Overlay`] instances wired up with hand-computed
//! finger tables. Exercises the two universal properties that need more
//! than one node's worth of state to mean anything: ring closure and
//! finger discipline.

use chordite::{
    key::Key,
    net::Endpoint,
    node::Node,
    overlay::{Overlay, RouteDecision},
};

const BITS: u32 = 8;
const MODULUS: u64 = 1 << BITS;
const IDS: [u64; 6] = [10, 40, 90, 130, 200, 250];

fn endpoint_for(i: usize) -> Endpoint {
    format!("127.0.0.1:{}", 20_000 + i).parse().expect("valid loopback endpoint")
}

fn ring_successor_oracle(k: u64) -> u64 {
    IDS.iter().copied().find(|&id| id >= k).unwrap_or(IDS[0])
}

/// Builds the 6 nodes and their [`Overlay`]s with every finger row set to
/// its textbook-correct owner, computed directly from `IDS` rather than
/// through any routing logic under test.
fn build_ring() -> (Vec<Node>, Vec<Overlay>) {
    let nodes: Vec<Node> =
        IDS.iter().enumerate().map(|(i, &id)| Node::new(Key::from_u64(id, BITS), endpoint_for(i))).collect();

    let mut overlays: Vec<Overlay> = nodes.iter().map(|n| Overlay::solo(n.clone(), BITS)).collect();

    for (idx, &id) in IDS.iter().enumerate() {
        for i in 0..BITS {
            let target = (id + (1u64 << i)) % MODULUS;
            let owner_id = ring_successor_oracle(target);
            let owner_idx = IDS.iter().position(|&x| x == owner_id).expect("owner is one of IDS");
            overlays[idx].set_finger(i as usize, nodes[owner_idx].clone());
        }
    }

    (nodes, overlays)
}

/// Routes `k` starting from `overlays[start]` the same way
/// `Runner::route` does, but entirely in memory: translate each
/// `Forward` into a jump to that node's own `Overlay`.
fn simulate_route(nodes: &[Node], overlays: &[Overlay], start: usize, k: &Key) -> Node {
    let mut current = start;
    for _ in 0..(IDS.len() * 2 + 4) {
        match overlays[current].find_successor_locally(k) {
            RouteDecision::Answer(n) => return n,
            RouteDecision::Forward(n) => {
                current = nodes.iter().position(|node| node.id == n.id).expect("forward target is a ring member");
            },
        }
    }
    panic!("route({k}) did not converge");
}

/// Property 1 (ring closure): for every key on the ring, iterating
/// `FindSuccessor` from every possible starting node converges to the
/// unique correct owner.
#[test]
fn find_successor_converges_to_the_correct_owner_from_any_start() {
    let (nodes, overlays) = build_ring();

    for k in 0..MODULUS {
        let key = Key::from_u64(k, BITS);
        let expected = ring_successor_oracle(k);
        for start in 0..IDS.len() {
            let owner = simulate_route(&nodes, &overlays, start, &key);
            assert_eq!(
                owner.id,
                Key::from_u64(expected, BITS),
                "key {k} starting from node {start} resolved to {}, expected {expected}",
                owner.id
            );
        }
    }
}

/// Property 2 (finger discipline): `Fingers[i].Node` is the ring
/// successor of `n.Id + 2^i` for every node and every row.
#[test]
fn every_finger_row_matches_the_ring_successor_formula() {
    let (_nodes, overlays) = build_ring();

    for (idx, &id) in IDS.iter().enumerate() {
        for i in 0..BITS {
            let target = (id + (1u64 << i)) % MODULUS;
            let expected_owner = ring_successor_oracle(target);
            let entry = overlays[idx].fingers.entry(i as usize);
            let got = entry.node.as_ref().expect("every row was assigned");
            assert_eq!(
                got.id,
                Key::from_u64(expected_owner, BITS),
                "node {idx} finger[{i}] pointed at {}, expected owner {expected_owner}",
                got.id
            );
        }
    }

    // Row 0 and `successor()` must always agree.
    for (idx, overlay) in overlays.iter().enumerate() {
        assert_eq!(overlay.successor().id, overlay.fingers.entry(0).node.as_ref().expect("row 0 set").id, "node {idx}");
    }
}
