// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{net::IpAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use chordite::{
    cfg::{
        config::{BuffersConfig, Config, HttpConfig, IdentityConfig, OverlayConfig, RuntimeConfig},
        enums::Digest,
    },
    net::Endpoint,
    runner::{InMemoryStore, Runner},
};
use tokio::{io::AsyncReadExt, net::TcpStream};

/// A config suitable for loopback tests: short maintenance periods so
/// stabilize/fix_fingers converge quickly, and a seeded identity so test
/// assertions can rely on a stable node Id.
pub fn test_config(port: u16, bits: u32, seed: &str) -> Config {
    Config {
        identity: IdentityConfig { bits, seed: Some(seed.to_string()), digest: Digest::Sha1 },
        listen: Endpoint::new(IpAddr::from([127, 0, 0, 1]), port),
        overlay: OverlayConfig {
            stabilize_period: Duration::from_millis(30),
            fix_fingers_period: Duration::from_millis(40),
            check_predecessor_period: Duration::from_millis(60),
            rpc_deadline: Duration::from_millis(500),
        },
        buffers: BuffersConfig {
            request_buffer_size: 4096,
            response_buffer_size: 4096,
            growth_cap: None,
        },
        http: HttpConfig {
            max_header_size: 8 * 1024,
            max_body_size: 64 * 1024,
            max_file_size: 1 << 20,
            send_file_threshold: 1 << 16,
            host_name: "chordite-test".into(),
            timeout: Duration::from_secs(5),
        },
        runtime: RuntimeConfig::default(),
    }
}

/// Builds a [`Runner`] over an in-memory store and spawns its event
/// loop/maintenance tasks, giving the listener a moment to bind before
/// returning.
pub async fn spawn_node(cfg: &Config) -> Arc<Runner> {
    let runner = Arc::new(Runner::new(cfg, Arc::new(InMemoryStore::default())).expect("valid test config"));
    tokio::spawn(runner.clone().run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    runner
}

/// Reads one HTTP/1.x response off `stream`: the status line/headers via
/// `httparse`, then exactly `Content-Length` bytes of body. Returns
/// `(status, body)`. Used by the keep-alive scenario, which cares about
/// the socket staying open across several of these in a row.
pub async fn read_http_response(stream: &mut TcpStream) -> Result<(u16, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        let n = stream.read(&mut scratch).await.context("reading response headers")?;
        if n == 0 {
            bail!("connection closed before a full response header arrived");
        }
        buf.extend_from_slice(&scratch[..n]);
    };

    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut response = httparse::Response::new(&mut headers);
    response.parse(&buf[..header_end]).context("parsing response headers")?;
    let status = response.code.context("response missing status code")?;
    let content_length: usize = response
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-length"))
        .map(|h| std::str::from_utf8(h.value).unwrap_or("0").parse().unwrap_or(0))
        .unwrap_or(0);

    let body_start = header_end;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut scratch).await.context("reading response body")?;
        if n == 0 {
            bail!("connection closed before the full response body arrived");
        }
        buf.extend_from_slice(&scratch[..n]);
    }

    let body = buf[body_start..body_start + content_length].to_vec();
    Ok((status, body))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}
