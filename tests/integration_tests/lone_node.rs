// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::Result;

use crate::integration_tests::common::{spawn_node, test_config};

/// S1: a solo node pings itself and gets a prompt `Normal` round trip.
#[tokio::test]
async fn lone_node_pings_itself() -> Result<()> {
    let cfg = test_config(18_881, 32, "lone-node");
    let runner = spawn_node(&cfg).await;

    let rtt = runner.ping(runner.self_node().endpoint).await?;
    assert!(rtt < Duration::from_millis(50), "loopback ping took {rtt:?}");

    runner.stop();
    Ok(())
}

/// A solo node is its own successor and has no predecessor until someone
/// notifies it.
#[tokio::test]
async fn lone_node_is_its_own_successor() -> Result<()> {
    let cfg = test_config(18_882, 32, "lone-node-successor");
    let runner = spawn_node(&cfg).await;

    assert_eq!(runner.successor().await.id, runner.self_node().id);
    assert!(runner.predecessor().await.is_none());

    runner.stop();
    Ok(())
}
