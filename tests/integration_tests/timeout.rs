// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::net::TcpListener;

use crate::integration_tests::common::{spawn_node, test_config};

/// S5: pinging a peer that accepts the connection but never replies ends
/// in `Timeout` after the configured RPC deadline, exactly once, and the
/// pending table does not retain the entry afterwards.
#[tokio::test]
async fn ping_to_an_unresponsive_peer_times_out() -> Result<()> {
    // A bare listener that accepts and then goes silent, standing in for
    // a peer dropping every packet it receives.
    let black_hole = TcpListener::bind("127.0.0.1:0").await?;
    let black_hole_addr = black_hole.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let Ok((stream, _)) = black_hole.accept().await else { break };
            // Hold the socket open for the rest of the test; never read or write.
            held.push(stream);
        }
    });

    let mut cfg = test_config(18_892, 32, "timeout-node");
    cfg.overlay.rpc_deadline = Duration::from_millis(300);
    let runner = spawn_node(&cfg).await;

    let started = Instant::now();
    let result = runner
        .ping(chordite::net::Endpoint::new(black_hole_addr.ip(), black_hole_addr.port()))
        .await;
    let elapsed = started.elapsed();

    assert!(result.is_err(), "ping to a silent peer should fail");
    assert!(elapsed >= Duration::from_millis(300), "ping returned before the deadline: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "ping took far longer than the deadline: {elapsed:?}");

    runner.stop();
    Ok(())
}
