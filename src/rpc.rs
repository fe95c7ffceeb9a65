// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! RPC client layer: wires DHT wire messages to the pending-request
//! table via a background read task demultiplexing inbound frames by
//! correlation Id, a `CancellationToken` for graceful shutdown, and
//! `io_with_timeout`-style deadline wrapping around writes.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::{Mutex, mpsc},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    buffer::ByteQueue,
    error::ReportCode,
    net::Endpoint,
    pending::{PendingEvent, PendingTable},
    wire::{Message, Opcode},
};

/// Inbound request frames (as opposed to replies, which the pending
/// table consumes directly) are handed to whoever owns the runner's
/// `OnXxx` dispatch.
pub type InboundRequest = Message;

/// A live connection to one peer, correlating its replies via a shared
/// [`PendingTable`] and forwarding inbound requests to `inbound_tx`.
pub struct RpcConnection {
    stream: Arc<Mutex<TcpStream>>,
    pending: Arc<PendingTable>,
    cancel: CancellationToken,
    self_id: Bytes,
    max_payload: usize,
}

impl RpcConnection {
    pub async fn connect(
        endpoint: Endpoint,
        self_id: Bytes,
        pending: Arc<PendingTable>,
        max_payload: usize,
    ) -> Result<(Arc<Self>, mpsc::UnboundedReceiver<InboundRequest>)> {
        let stream = TcpStream::connect(endpoint.to_socket_addr())
            .await
            .with_context(|| format!("failed to connect to {endpoint}"))?;
        Ok(Self::from_stream(stream, self_id, pending, max_payload))
    }

    /// Wraps an already-connected (or already-accepted) stream, e.g. one
    /// handed to us by the event loop on an inbound connect.
    pub fn from_stream(
        stream: TcpStream,
        self_id: Bytes,
        pending: Arc<PendingTable>,
        max_payload: usize,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<InboundRequest>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Self {
            stream: Arc::new(Mutex::new(stream)),
            pending,
            cancel: CancellationToken::new(),
            self_id,
            max_payload,
        });
        tokio::spawn(conn.clone().read_loop(inbound_tx));
        (conn, inbound_rx)
    }

    /// Dispatches a new RPC: allocates a correlation Id, transmits the
    /// message, and returns the hop/end event stream.
    pub async fn dispatch(
        &self,
        opcode: Opcode,
        payload: Bytes,
        deadline: Duration,
    ) -> Result<(u64, mpsc::UnboundedReceiver<PendingEvent>)> {
        let (id, rx) = self.pending.dispatch(deadline);
        let msg = Message::new(opcode, id, self.self_id.clone(), payload);
        if let Err(e) = self.send(&msg).await {
            self.pending.end(id, ReportCode::PeerUnreachable);
            return Err(e);
        }
        Ok((id, rx))
    }

    /// Sends a reply frame (`*Reply`/`SetAck`/`Pong`) echoing the
    /// request's correlation Id — never registered in the pending table,
    /// since we did not originate it.
    pub async fn reply(&self, opcode: Opcode, correlation_id: u64, payload: Bytes) -> Result<()> {
        let msg = Message::new(opcode, correlation_id, self.self_id.clone(), payload);
        self.send(&msg).await
    }

    async fn send(&self, msg: &Message) -> Result<()> {
        let bytes = msg.encode(self.max_payload)?;
        let mut stream = self.stream.lock().await;
        io_with_timeout(
            &self.cancel,
            Duration::from_secs(30),
            stream.write_all(&bytes),
        )
        .await
        .context("write failed or timed out")?
    }

    pub fn close(&self) {
        self.cancel.cancel();
        self.pending.cancel_all(ReportCode::Cancelled);
    }

    async fn read_loop(self: Arc<Self>, inbound_tx: mpsc::UnboundedSender<InboundRequest>) {
        let mut queue = ByteQueue::with_capacity(self.max_payload * 2, true);
        let mut scratch = vec![0u8; 8192];
        loop {
            let n = {
                let mut stream = self.stream.lock().await;
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    r = stream.read(&mut scratch) => match r {
                        Ok(0) => { self.on_disconnect(); break; },
                        Ok(n) => n,
                        Err(e) => { warn!(error = %e, "rpc read failed"); self.on_disconnect(); break; },
                    },
                }
            };
            if queue.add(&scratch[..n]).is_err() {
                warn!("rpc ingress buffer overflowed a non-growable queue");
                self.on_disconnect();
                break;
            }
            self.drain_frames(&mut queue, &inbound_tx);
        }
    }

    fn drain_frames(&self, queue: &mut ByteQueue, inbound_tx: &mpsc::UnboundedSender<InboundRequest>) {
        loop {
            let (head, tail) = queue.as_slices();
            let contiguous: std::borrow::Cow<[u8]> = if tail.is_empty() {
                std::borrow::Cow::Borrowed(head)
            } else {
                let mut joined = Vec::with_capacity(head.len() + tail.len());
                joined.extend_from_slice(head);
                joined.extend_from_slice(tail);
                std::borrow::Cow::Owned(joined)
            };

            match Message::try_decode(&contiguous) {
                Ok(Some((msg, consumed))) => {
                    let mut discard = vec![0u8; consumed];
                    let _ = queue.take_n(&mut discard);
                    self.route_inbound(msg, inbound_tx);
                },
                Ok(None) => break,
                Err(e) => {
                    debug!(error = %e, "dropping malformed rpc frame");
                    queue.clear();
                    break;
                },
            }
        }
    }

    fn route_inbound(&self, msg: Message, inbound_tx: &mpsc::UnboundedSender<InboundRequest>) {
        // `Data` never expects a correlated reply (it's the wire form of
        // the one-way `SendTo` API), so it is handed to the inbound sink
        // alongside true requests rather than matched against our own
        // pending table.
        if msg.opcode.is_request() || msg.opcode == Opcode::Data {
            let _ = inbound_tx.send(msg);
            return;
        }
        match msg.opcode {
            Opcode::QueryReply | Opcode::RouteReply => {
                self.pending.hop(msg.correlation_id, msg.payload);
                self.pending.end(msg.correlation_id, ReportCode::Normal);
            },
            Opcode::KeysReply => {
                // Iterative: a caller may see several hops before the
                // empty-payload sentinel that closes the sequence, so the
                // entry is only ended once that sentinel arrives, rather
                // than after every hop.
                let is_sentinel = msg.payload.is_empty();
                self.pending.hop(msg.correlation_id, msg.payload);
                if is_sentinel {
                    self.pending.end(msg.correlation_id, ReportCode::Normal);
                }
            },
            Opcode::Pong | Opcode::PredecessorReply | Opcode::GetReply | Opcode::SetAck => {
                self.pending.hop(msg.correlation_id, msg.payload);
                self.pending.end(msg.correlation_id, ReportCode::Normal);
            },
            _ => {},
        }
    }

    fn on_disconnect(&self) {
        self.pending.cancel_all(ReportCode::PeerUnreachable);
    }
}

/// Races `fut` against cancellation and a fixed timeout, mirroring the
/// teacher's `io_with_timeout` helper.
async fn io_with_timeout<F, T>(cancel: &CancellationToken, timeout: Duration, fut: F) -> Result<T>
where F: std::future::Future<Output = std::io::Result<T>> {
    tokio::select! {
        _ = cancel.cancelled() => bail!("connection cancelled"),
        r = tokio::time::timeout(timeout, fut) => match r {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => bail!("operation timed out after {timeout:?}"),
        },
    }
}
