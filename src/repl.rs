// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The process's minimal REPL: reads lines from standard input and
//! dispatches them to a running [`crate::runner::Runner`]. Two utility
//! commands (`hash`, `endpoint`) are included alongside the DHT verbs even
//! though they touch no ring state, since they're handy for inspecting
//! keys and addresses interactively.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::{digest, key::Key, net::Endpoint, runner::Runner};

/// Drives the REPL loop until `quit`/`exit` or EOF on stdin, then stops
/// the runner's background tasks. Returns `Ok(())` on every clean exit
/// path so `main` can report process exit code 0.
pub async fn run(runner: Arc<Runner>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    print_banner(&runner);
    loop {
        print!("chordite> ");
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match dispatch(&runner, line).await {
            Ok(Quit::Continue) => {},
            Ok(Quit::Stop) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
    }

    runner.stop();
    info!("repl exiting");
    Ok(())
}

enum Quit {
    Continue,
    Stop,
}

async fn dispatch(runner: &Arc<Runner>, line: &str) -> Result<Quit> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else { return Ok(Quit::Continue) };
    let rest: Vec<&str> = parts.collect();

    match cmd {
        "help" => {
            print_help();
        },
        "self" => {
            println!("{}", runner.self_node());
        },
        "ping" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let rtt = runner.ping(endpoint).await?;
            println!("pong from {endpoint} in {rtt:?}");
        },
        "query" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let key = parse_key(runner, &rest, 1)?;
            let decision = runner.query(endpoint, &key).await?;
            println!("{decision:?}");
        },
        "route" => {
            let key = parse_key(runner, &rest, 0)?;
            let owner = runner.route(&key).await?;
            println!("{owner}");
        },
        "bootstrap" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            runner.bootstrap(endpoint).await?;
            println!("joined via {endpoint}");
        },
        "keys" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let keys = runner.keys(endpoint).await?;
            for k in &keys {
                println!("{}", hex::encode(k));
            }
            println!("({} key(s))", keys.len());
        },
        "set" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let key = parse_key(runner, &rest, 1)?;
            let value = rest.get(2).copied().unwrap_or_default();
            let report = runner.set(endpoint, &key, Bytes::copy_from_slice(value.as_bytes())).await?;
            println!("{report}");
        },
        "get" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let key = parse_key(runner, &rest, 1)?;
            match runner.get(endpoint, &key).await? {
                Some(v) => println!("{}", String::from_utf8_lossy(&v)),
                None => println!("(not found)"),
            }
        },
        "send" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            let payload = rest.get(1..).unwrap_or_default().join(" ");
            runner.send_to(endpoint, Bytes::from(payload.into_bytes())).await?;
            println!("sent");
        },
        "hash" => {
            let Some(algo) = rest.first() else {
                anyhow::bail!("usage: hash <algorithm> <text>");
            };
            let text = rest.get(1..).unwrap_or_default().join(" ");
            let digest = digest::by_name(algo).ok_or_else(|| anyhow::anyhow!("unknown digest {algo}"))?;
            let key = Key::from_digest(digest, text.as_bytes(), runner.self_node().id.bits());
            println!("{key}");
        },
        "endpoint" => {
            let endpoint = parse_endpoint(&rest, 0)?;
            println!("{endpoint}");
        },
        "quit" | "exit" => return Ok(Quit::Stop),
        other => {
            println!("unknown command {other:?}; try `help`");
        },
    }

    Ok(Quit::Continue)
}

fn parse_endpoint(rest: &[&str], index: usize) -> Result<Endpoint> {
    let raw = rest
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("missing endpoint argument"))?;
    raw.parse::<Endpoint>().map_err(|e| anyhow::anyhow!("invalid endpoint {raw:?}: {e}"))
}

fn parse_key(runner: &Runner, rest: &[&str], index: usize) -> Result<Key> {
    let raw = rest.get(index).ok_or_else(|| anyhow::anyhow!("missing key argument"))?;
    let bytes = hex::decode(raw).map_err(|e| anyhow::anyhow!("invalid hex key {raw:?}: {e}"))?;
    Ok(Key::from_bytes_be(&bytes, runner.self_node().id.bits()))
}

fn print_banner(runner: &Runner) {
    println!("chordite node {}", runner.self_node());
    println!("type `help` for a command list, `quit` to exit");
}

fn print_help() {
    println!("self                                 print this node's Id and endpoint");
    println!("ping <endpoint>                      round-trip a Ping");
    println!("query <endpoint> <hexkey>             single-hop FindSuccessor query");
    println!("route <hexkey>                       iterative FindSuccessor until it converges");
    println!("bootstrap <endpoint>                 join the ring through a known member");
    println!("keys <endpoint>                      list the keys a peer is responsible for");
    println!("set <endpoint> <hexkey> [value]      store a value at a peer");
    println!("get <endpoint> <hexkey>               fetch a value from a peer");
    println!("send <endpoint> <text>                fire-and-forget Data payload");
    println!("hash <algorithm> <text>               derive a Key from a digest of text");
    println!("endpoint <address:port>                parse and re-render an endpoint");
    println!("quit | exit                          stop the node and leave the REPL");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_endpoint_rejects_missing_argument() {
        assert!(parse_endpoint(&[], 0).is_err());
    }

    #[test]
    fn parse_endpoint_accepts_host_port() {
        let endpoint = parse_endpoint(&["127.0.0.1:9001"], 0).expect("valid endpoint");
        assert_eq!(endpoint.port, 9001);
    }
}
