// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::integration_tests::common::{read_http_response, spawn_node, test_config};

/// S6: two HTTP/1.1 requests back-to-back on one connection both get 200
/// OK and the socket stays open; a third request carrying `Connection:
/// close` makes the server close after replying.
#[tokio::test]
async fn keep_alive_then_explicit_close() -> Result<()> {
    let cfg = test_config(18_889, 32, "http-keep-alive");
    let runner = spawn_node(&cfg).await;
    let addr = runner.self_node().endpoint.to_socket_addr();

    let mut stream = TcpStream::connect(addr).await?;

    stream.write_all(b"GET /status HTTP/1.1\r\nHost: test\r\n\r\n").await?;
    let (status1, _) = read_http_response(&mut stream).await?;
    assert_eq!(status1, 200);

    stream.write_all(b"GET /status HTTP/1.1\r\nHost: test\r\n\r\n").await?;
    let (status2, _) = read_http_response(&mut stream).await?;
    assert_eq!(status2, 200);

    stream
        .write_all(b"GET /status HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
        .await?;
    let (status3, _) = read_http_response(&mut stream).await?;
    assert_eq!(status3, 200);

    // Server closes its half after an explicit `Connection: close`; the
    // next read must observe EOF rather than another response.
    let mut probe = [0u8; 1];
    let n = stream.read(&mut probe).await?;
    assert_eq!(n, 0, "server should have closed the connection");

    runner.stop();
    Ok(())
}

/// `GET /get/<hex>` for a key nobody has `Set` yet answers 404.
#[tokio::test]
async fn get_of_unknown_key_is_not_found() -> Result<()> {
    let cfg = test_config(18_890, 32, "http-404");
    let runner = spawn_node(&cfg).await;
    let addr = runner.self_node().endpoint.to_socket_addr();

    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(b"GET /get/deadbeef HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
        .await?;
    let (status, _) = read_http_response(&mut stream).await?;
    assert_eq!(status, 404);

    runner.stop();
    Ok(())
}

/// `PUT /set/<hex>` followed by `GET /get/<hex>` round-trips the body
/// through the HTTP surface without ever going through the DHT wire.
#[tokio::test]
async fn http_set_then_get_round_trips_a_value() -> Result<()> {
    let cfg = test_config(18_891, 32, "http-set-get");
    let runner = spawn_node(&cfg).await;
    let addr = runner.self_node().endpoint.to_socket_addr();

    let mut put_stream = TcpStream::connect(addr).await?;
    let body = b"hi there";
    let request = format!(
        "PUT /set/abcd HTTP/1.1\r\nHost: test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    put_stream.write_all(request.as_bytes()).await?;
    put_stream.write_all(body).await?;
    let (put_status, _) = read_http_response(&mut put_stream).await?;
    assert_eq!(put_status, 200);

    let mut get_stream = TcpStream::connect(addr).await?;
    get_stream
        .write_all(b"GET /get/abcd HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
        .await?;
    let (get_status, get_body) = read_http_response(&mut get_stream).await?;
    assert_eq!(get_status, 200);
    assert_eq!(get_body, body);

    runner.stop();
    Ok(())
}
