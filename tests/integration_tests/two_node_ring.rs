// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;

use crate::integration_tests::common::{spawn_node, test_config};

/// S2: `B` bootstraps off `A`; after a few stabilize rounds each node is
/// the other's successor and predecessor.
#[tokio::test]
async fn two_nodes_converge_to_a_mutual_ring() -> Result<()> {
    let a_cfg = test_config(18_883, 32, "ring-a");
    let b_cfg = test_config(18_884, 32, "ring-b");
    let a = spawn_node(&a_cfg).await;
    let b = spawn_node(&b_cfg).await;

    b.bootstrap(a.self_node().endpoint).await?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(a.successor().await.id, b.self_node().id);
    assert_eq!(b.successor().await.id, a.self_node().id);
    assert_eq!(a.predecessor().await.map(|n| n.id), Some(b.self_node().id.clone()));
    assert_eq!(b.predecessor().await.map(|n| n.id), Some(a.self_node().id.clone()));

    a.stop();
    b.stop();
    Ok(())
}

/// S3: routing a key equal to a node's own Id always resolves to that
/// node, regardless of which of the two happens to own the rest of the
/// ring — the ring-invariant form of "route(k) returns the right owner"
/// that does not depend on the two nodes' relative Id ordering.
#[tokio::test]
async fn route_resolves_to_the_owning_node() -> Result<()> {
    let a_cfg = test_config(18_885, 32, "route-a");
    let b_cfg = test_config(18_886, 32, "route-b");
    let a = spawn_node(&a_cfg).await;
    let b = spawn_node(&b_cfg).await;

    b.bootstrap(a.self_node().endpoint).await?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let a_id = a.self_node().id.clone();
    let b_id = b.self_node().id.clone();

    assert_eq!(a.route(&a_id).await?.id, a_id);
    assert_eq!(a.route(&b_id).await?.id, b_id);
    assert_eq!(b.route(&a_id).await?.id, a_id);
    assert_eq!(b.route(&b_id).await?.id, b_id);

    a.stop();
    b.stop();
    Ok(())
}

/// S4: a value set through `A` is visible through `Get` on either node.
#[tokio::test]
async fn set_on_one_node_is_visible_through_get_on_either() -> Result<()> {
    let a_cfg = test_config(18_887, 32, "setget-a");
    let b_cfg = test_config(18_888, 32, "setget-b");
    let a = spawn_node(&a_cfg).await;
    let b = spawn_node(&b_cfg).await;

    b.bootstrap(a.self_node().endpoint).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let key = a.self_node().id.clone();
    let report = a.set(a.self_node().endpoint, &key, Bytes::from_static(b"Hello there")).await?;
    assert!(!report.is_failure());

    let via_a = a.get(a.self_node().endpoint, &key).await?;
    assert_eq!(via_a.as_deref(), Some(&b"Hello there"[..]));

    let via_b = b.get(a.self_node().endpoint, &key).await?;
    assert_eq!(via_b.as_deref(), Some(&b"Hello there"[..]));

    a.stop();
    b.stop();
    Ok(())
}
