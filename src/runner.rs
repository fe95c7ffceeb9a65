// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The DHT runner: binds identity, the overlay engine, the
//! pending-request table and the RPC/HTTP transports into one object,
//! exposing the user-facing API (`Ping, Query, Route, Bootstrap, Keys,
//! Set, Get, SendTo`) and dispatching inbound opcodes to the `OnXxx`
//! callbacks, for a whole Chord ring rather than a single peer connection.

use std::{net::SocketAddr, sync::Arc, time::{Duration, Instant}};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use dashmap::DashMap;
use tokio::{net::TcpListener, sync::Mutex as AsyncMutex, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    cfg::config::Config,
    error::ReportCode,
    eventloop::{EventLoop, Interest},
    http::{ConnectionHandler, ParsedRequest, RequestHandler, Response, Settings},
    key::Key,
    net::Endpoint,
    node::Node,
    overlay::{Overlay, RouteDecision},
    pending::{PendingEvent, PendingTable},
    rpc::RpcConnection,
    wire::{
        Opcode,
        codec::{decode_key, decode_node, decode_route_decision, encode_key, encode_node, encode_route_decision},
    },
};

/// Shared ring state: the overlay engine, mutated by HTTP handlers,
/// inbound RPC dispatch, and the maintenance tasks alike.
pub struct NodeState {
    pub overlay: Overlay,
}

pub type SharedState = Arc<AsyncMutex<NodeState>>;

/// User-provided handlers for the server side of `Keys`, `Set`, `Get` and
/// `Data` (the `OnKeys`/`OnSet`/`OnGet`/`OnData` callbacks).
pub trait DhtCallbacks: Send + Sync {
    fn on_keys(&self, from: &Node) -> Vec<Bytes>;
    fn on_set(&self, key: &Key, value: Bytes) -> ReportCode;
    fn on_get(&self, key: &Key) -> Option<Bytes>;
    fn on_data(&self, from: &Node, payload: Bytes);
}

/// A trivial in-memory key/value store, sufficient for the demo REPL and
/// the S4 set/get scenario; real deployments supply their own
/// [`DhtCallbacks`].
#[derive(Default)]
pub struct InMemoryStore {
    values: DashMap<Vec<u8>, Bytes>,
}

impl DhtCallbacks for InMemoryStore {
    fn on_keys(&self, _from: &Node) -> Vec<Bytes> {
        self.values.iter().map(|kv| Bytes::copy_from_slice(kv.key())).collect()
    }

    fn on_set(&self, key: &Key, value: Bytes) -> ReportCode {
        self.values.insert(key.to_bytes_be(), value);
        ReportCode::Normal
    }

    fn on_get(&self, key: &Key) -> Option<Bytes> {
        self.values.get(&key.to_bytes_be()).map(|v| v.clone())
    }

    fn on_data(&self, from: &Node, payload: Bytes) {
        debug!(from = %from, len = payload.len(), "received unsolicited Data");
    }
}

/// Binds identity, overlay, pending table and transports; the single
/// object the REPL drives.
pub struct Runner {
    self_node: Node,
    listen: Endpoint,
    state: SharedState,
    pending: Arc<PendingTable>,
    peers: Arc<DashMap<SocketAddr, Arc<RpcConnection>>>,
    callbacks: Arc<dyn DhtCallbacks>,
    http_settings: Settings,
    rpc_deadline: Duration,
    stabilize_period: Duration,
    fix_fingers_period: Duration,
    check_predecessor_period: Duration,
    bits: u32,
    cancel: CancellationToken,
}

impl Runner {
    pub fn new(cfg: &Config, callbacks: Arc<dyn DhtCallbacks>) -> Result<Self> {
        let bits = cfg.identity.bits;
        let id = match &cfg.identity.seed {
            Some(seed) => {
                let digest = crate::digest::by_name(cfg.identity.digest.as_str())
                    .context("unknown digest algorithm in identity.digest")?;
                Key::from_digest(digest, seed.as_bytes(), bits)
            },
            None => Key::random(bits),
        };
        let self_node = Node::new(id, cfg.listen);
        let overlay = Overlay::solo(self_node.clone(), bits);
        Ok(Self {
            self_node,
            listen: cfg.listen,
            state: Arc::new(AsyncMutex::new(NodeState { overlay })),
            pending: Arc::new(PendingTable::new()),
            peers: Arc::new(DashMap::new()),
            callbacks,
            http_settings: Settings::from(cfg),
            rpc_deadline: cfg.overlay.rpc_deadline,
            stabilize_period: cfg.overlay.stabilize_period,
            fix_fingers_period: cfg.overlay.fix_fingers_period,
            check_predecessor_period: cfg.overlay.check_predecessor_period,
            bits,
            cancel: CancellationToken::new(),
        })
    }

    pub fn self_node(&self) -> &Node {
        &self.self_node
    }

    /// This node's current ring successor; `self_node()` itself
    /// until a bootstrap or notify installs a different one.
    pub async fn successor(&self) -> Node {
        self.state.lock().await.overlay.successor().clone()
    }

    /// This node's current ring predecessor, if any has been notified in.
    pub async fn predecessor(&self) -> Option<Node> {
        self.state.lock().await.overlay.predecessor.clone()
    }

    /// Signals every task spawned by [`Runner::run`] to wind down.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    async fn get_or_connect(&self, endpoint: Endpoint) -> Result<Arc<RpcConnection>> {
        let addr = endpoint.to_socket_addr();
        if let Some(existing) = self.peers.get(&addr) {
            return Ok(existing.clone());
        }
        let self_id = Bytes::from(self.self_node.id.to_bytes_be());
        let (conn, inbound_rx) =
            RpcConnection::connect(endpoint, self_id, self.pending.clone(), self.http_settings.max_body_size)
                .await
                .with_context(|| format!("connecting to peer {endpoint}"))?;
        self.peers.insert(addr, conn.clone());
        spawn_inbound_dispatcher(self.shared_for_dispatch(), conn.clone(), inbound_rx);
        Ok(conn)
    }

    fn shared_for_dispatch(&self) -> InboundDispatchContext {
        InboundDispatchContext {
            self_node: self.self_node.clone(),
            state: self.state.clone(),
            callbacks: self.callbacks.clone(),
            bits: self.bits,
        }
    }

    // ---- user-facing RPC API -------------------------------------------

    pub async fn ping(&self, endpoint: Endpoint) -> Result<Duration> {
        let conn = self.get_or_connect(endpoint).await?;
        let started = std::time::Instant::now();
        let (_, mut rx) = conn.dispatch(Opcode::Ping, Bytes::new(), self.rpc_deadline).await?;
        let report = await_end(&mut rx).await?;
        if report.is_failure() {
            bail!("ping {endpoint} ended with {report}");
        }
        Ok(started.elapsed())
    }

    /// Single-hop `Query(k)` against a specific node (non-recursive; the
    /// caller decides whether to keep forwarding).
    pub async fn query(&self, endpoint: Endpoint, k: &Key) -> Result<RouteDecision> {
        let conn = self.get_or_connect(endpoint).await?;
        let (_, mut rx) = conn.dispatch(Opcode::Query, encode_key(k), self.rpc_deadline).await?;
        let payload = await_single_hop(&mut rx).await?;
        let (answer, node) = decode_route_decision(&payload)?;
        Ok(if answer { RouteDecision::Answer(node) } else { RouteDecision::Forward(node) })
    }

    /// `Route(k)` (`FindSuccessor`), iterative: repeatedly `Query`
    /// the closest known node until one answers directly.
    pub async fn route(&self, k: &Key) -> Result<Node> {
        let local_decision = {
            let guard = self.state.lock().await;
            guard.overlay.find_successor_locally(k)
        };
        let mut current = match local_decision {
            RouteDecision::Answer(n) => return Ok(n),
            RouteDecision::Forward(n) => n,
        };
        let max_hops = (self.bits as usize).saturating_mul(4).max(32);
        for _ in 0..max_hops {
            match self.query(current.endpoint, k).await? {
                RouteDecision::Answer(n) => return Ok(n),
                RouteDecision::Forward(n) => current = n,
            }
        }
        bail!("route({k}) did not converge within {max_hops} hops")
    }

    /// `Join(known)`: resets the predecessor, then asks `known` to
    /// resolve our own Id and installs the answer as `Fingers[0]`.
    pub async fn bootstrap(&self, known: Endpoint) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            guard.overlay.begin_join();
        }
        let successor = match self.query(known, &self.self_node.id).await? {
            RouteDecision::Answer(n) => n,
            RouteDecision::Forward(n) => n,
        };
        let mut guard = self.state.lock().await;
        guard.overlay.set_finger(0, successor);
        Ok(())
    }

    /// Asks `endpoint` for the keys it is responsible for.
    /// `KeysReply` is a Hop-only opcode with no wire-level `End`, so the
    /// server side terminates the stream with one empty-payload reply
    /// rather than relying on a terminal `End` event.
    pub async fn keys(&self, endpoint: Endpoint) -> Result<Vec<Bytes>> {
        let conn = self.get_or_connect(endpoint).await?;
        let (_, mut rx) = conn.dispatch(Opcode::Keys, Bytes::new(), self.rpc_deadline).await?;
        await_hops_until_sentinel(&mut rx).await
    }

    pub async fn set(&self, endpoint: Endpoint, key: &Key, value: Bytes) -> Result<ReportCode> {
        let conn = self.get_or_connect(endpoint).await?;
        let mut payload = encode_key(key).to_vec();
        payload.extend_from_slice(&value);
        let (_, mut rx) = conn.dispatch(Opcode::Set, Bytes::from(payload), self.rpc_deadline).await?;
        await_end(&mut rx).await
    }

    pub async fn get(&self, endpoint: Endpoint, key: &Key) -> Result<Option<Bytes>> {
        let conn = self.get_or_connect(endpoint).await?;
        let (_, mut rx) = conn.dispatch(Opcode::Get, encode_key(key), self.rpc_deadline).await?;
        let hops = await_all_hops(&mut rx).await?;
        Ok(hops.into_iter().next())
    }

    /// Fire-and-forget `SendTo`: no pending-table entry is created since
    /// `Data` never carries a correlated reply.
    pub async fn send_to(&self, endpoint: Endpoint, payload: Bytes) -> Result<()> {
        let conn = self.get_or_connect(endpoint).await?;
        conn.reply(Opcode::Data, 0, payload).await
    }

    // ---- maintenance tasks ----------------------------------------------

    async fn stabilize_once(&self) -> Result<()> {
        let successor = { self.state.lock().await.overlay.successor().clone() };
        if successor == self.self_node {
            return Ok(());
        }
        let conn = self.get_or_connect(successor.endpoint).await?;
        let (_, mut rx) = conn.dispatch(Opcode::Predecessor, Bytes::new(), self.rpc_deadline).await?;
        let payload = await_single_hop(&mut rx).await?;
        let reported = if payload.is_empty() { None } else { Some(decode_node(&payload)?) };

        let new_successor = {
            let mut guard = self.state.lock().await;
            guard.overlay.stabilize_with_reported_predecessor(reported);
            guard.overlay.successor().clone()
        };

        let conn = self.get_or_connect(new_successor.endpoint).await?;
        let (_, mut rx) =
            conn.dispatch(Opcode::Notify, encode_node(&self.self_node), self.rpc_deadline).await?;
        await_end(&mut rx).await.ok();
        Ok(())
    }

    async fn fix_fingers_once(&self) -> Result<()> {
        let (index, start) = {
            let mut guard = self.state.lock().await;
            guard.overlay.next_finger_to_fix()
        };
        let resolved = self.route(&start).await?;
        let mut guard = self.state.lock().await;
        guard.overlay.set_finger(index, resolved);
        Ok(())
    }

    async fn check_predecessor_once(&self) -> Result<()> {
        let predecessor = { self.state.lock().await.overlay.predecessor.clone() };
        let Some(predecessor) = predecessor else { return Ok(()) };
        if self.ping(predecessor.endpoint).await.is_err() {
            self.state.lock().await.overlay.clear_predecessor();
        }
        Ok(())
    }

    /// Runs the accept loop (HTTP + DHT wire multiplexed on one listen
    /// socket, distinguished by the first byte: opcode range `0x01..=0x10`
    /// is wire framing, anything else is an HTTP request line) plus the
    /// three periodic maintenance tasks, until [`Runner::stop`] is called.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let listener = TcpListener::bind(self.listen.to_socket_addr())
            .await
            .with_context(|| format!("binding {}", self.listen))?;
        info!(node = %self.self_node, listen = %self.listen, "runner started");

        let (http_tx, http_rx) = tokio::sync::mpsc::unbounded_channel();
        let http_task = tokio::spawn(run_http_loop(self.state.clone(), self.http_settings.clone(), self.callbacks.clone(), http_rx));

        let accept_task = {
            let this = self.clone();
            tokio::spawn(async move { this.accept_loop(listener, http_tx).await })
        };

        let maintenance_task = {
            let this = self.clone();
            tokio::spawn(async move { this.maintenance_loop().await })
        };

        self.cancel.cancelled().await;
        accept_task.abort();
        maintenance_task.abort();
        http_task.abort();
        Ok(())
    }

    async fn accept_loop(
        self: Arc<Self>,
        listener: TcpListener,
        http_tx: tokio::sync::mpsc::UnboundedSender<(Arc<tokio::net::TcpStream>, Endpoint)>,
    ) {
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                },
            };
            let mut probe = [0u8; 1];
            let is_wire = matches!(stream.peek(&mut probe).await, Ok(1) if (0x01..=0x10).contains(&probe[0]));
            if is_wire {
                let self_id = Bytes::from(self.self_node.id.to_bytes_be());
                let (conn, inbound_rx) = RpcConnection::from_stream(
                    stream,
                    self_id,
                    self.pending.clone(),
                    self.http_settings.max_body_size,
                );
                self.peers.insert(addr, conn.clone());
                spawn_inbound_dispatcher(self.shared_for_dispatch(), conn, inbound_rx);
            } else {
                let endpoint = Endpoint::new(addr.ip(), addr.port());
                let _ = http_tx.send((Arc::new(stream), endpoint));
            }
        }
    }

    async fn maintenance_loop(self: Arc<Self>) {
        let mut stabilize = tokio::time::interval(self.stabilize_period);
        let mut fix_fingers = tokio::time::interval(self.fix_fingers_period);
        let mut check_predecessor = tokio::time::interval(self.check_predecessor_period);
        // Reaps pending RPCs whose deadline elapsed without an End; a
        // quarter of the RPC deadline keeps the table from accumulating
        // more than a few stale entries between sweeps.
        let mut pending_sweep = tokio::time::interval((self.rpc_deadline / 4).max(Duration::from_millis(100)));
        stabilize.set_missed_tick_behavior(MissedTickBehavior::Delay);
        fix_fingers.set_missed_tick_behavior(MissedTickBehavior::Delay);
        check_predecessor.set_missed_tick_behavior(MissedTickBehavior::Delay);
        pending_sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stabilize.tick() => {
                    if let Err(e) = self.stabilize_once().await {
                        debug!(error = %e, "stabilize round failed");
                    }
                }
                _ = fix_fingers.tick() => {
                    if let Err(e) = self.fix_fingers_once().await {
                        debug!(error = %e, "fix_fingers round failed");
                    }
                }
                _ = check_predecessor.tick() => {
                    if let Err(e) = self.check_predecessor_once().await {
                        debug!(error = %e, "check_predecessor round failed");
                    }
                }
                _ = pending_sweep.tick() => {
                    self.pending.sweep_expired(Instant::now());
                }
            }
        }
    }
}

async fn await_single_hop(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PendingEvent>) -> Result<Bytes> {
    match rx.recv().await {
        Some(PendingEvent::Hop(payload)) => Ok(payload),
        Some(PendingEvent::End(report)) => bail!("rpc ended before any hop: {report}"),
        None => bail!("rpc channel closed without a terminal report"),
    }
}

async fn await_all_hops(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PendingEvent>) -> Result<Vec<Bytes>> {
    let mut hops = Vec::new();
    loop {
        match rx.recv().await {
            Some(PendingEvent::Hop(payload)) => hops.push(payload),
            Some(PendingEvent::End(report)) => {
                if report.is_failure() {
                    bail!("rpc failed: {report}");
                }
                return Ok(hops);
            },
            None => bail!("rpc channel closed without a terminal report"),
        }
    }
}

/// Like [`await_all_hops`], but for the Hop-only opcodes (`KeysReply`):
/// an empty-payload hop is the server's end-of-stream marker rather than
/// a wire-level `End`.
async fn await_hops_until_sentinel(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PendingEvent>) -> Result<Vec<Bytes>> {
    let mut hops = Vec::new();
    loop {
        match rx.recv().await {
            Some(PendingEvent::Hop(payload)) if payload.is_empty() => return Ok(hops),
            Some(PendingEvent::Hop(payload)) => hops.push(payload),
            Some(PendingEvent::End(report)) => {
                if report.is_failure() {
                    bail!("rpc failed: {report}");
                }
                return Ok(hops);
            },
            None => bail!("rpc channel closed without a terminal report"),
        }
    }
}

async fn await_end(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PendingEvent>) -> Result<ReportCode> {
    loop {
        match rx.recv().await {
            Some(PendingEvent::Hop(_)) => continue,
            Some(PendingEvent::End(report)) => return Ok(report),
            None => bail!("rpc channel closed without a terminal report"),
        }
    }
}

/// Shared read-only context an inbound-request dispatcher needs; kept
/// small and `Clone` so each peer connection's dispatcher task can own a
/// copy instead of borrowing the `Runner`.
#[derive(Clone)]
struct InboundDispatchContext {
    self_node: Node,
    state: SharedState,
    callbacks: Arc<dyn DhtCallbacks>,
    bits: u32,
}

fn spawn_inbound_dispatcher(
    ctx: InboundDispatchContext,
    conn: Arc<RpcConnection>,
    mut inbound_rx: tokio::sync::mpsc::UnboundedReceiver<crate::rpc::InboundRequest>,
) {
    tokio::spawn(async move {
        while let Some(msg) = inbound_rx.recv().await {
            if let Err(e) = handle_inbound(&ctx, &conn, msg).await {
                debug!(error = %e, "failed to answer inbound request");
            }
        }
    });
}

async fn handle_inbound(ctx: &InboundDispatchContext, conn: &Arc<RpcConnection>, msg: crate::wire::Message) -> Result<()> {
    let correlation_id = msg.correlation_id;
    match msg.opcode {
        Opcode::Ping => {
            conn.reply(Opcode::Pong, correlation_id, Bytes::new()).await?;
        },
        Opcode::Query => {
            let k = decode_key(&msg.payload)?;
            let decision = { ctx.state.lock().await.overlay.find_successor_locally(&k) };
            let payload = match &decision {
                RouteDecision::Answer(n) => encode_route_decision(true, n),
                RouteDecision::Forward(n) => encode_route_decision(false, n),
            };
            conn.reply(Opcode::QueryReply, correlation_id, payload).await?;
        },
        Opcode::Route => {
            // Server-side `Route` answers exactly like `Query`; iterative
            // vs recursive routing is a client-side policy choice.
            let k = decode_key(&msg.payload)?;
            let decision = { ctx.state.lock().await.overlay.find_successor_locally(&k) };
            let payload = match &decision {
                RouteDecision::Answer(n) => encode_route_decision(true, n),
                RouteDecision::Forward(n) => encode_route_decision(false, n),
            };
            conn.reply(Opcode::RouteReply, correlation_id, payload).await?;
        },
        Opcode::Notify => {
            let node = decode_node(&msg.payload)?;
            ctx.state.lock().await.overlay.notify(node);
            conn.reply(Opcode::SetAck, correlation_id, Bytes::new()).await?;
        },
        Opcode::Predecessor => {
            let predecessor = { ctx.state.lock().await.overlay.predecessor.clone() };
            let payload = predecessor.as_ref().map(encode_node).unwrap_or_default();
            conn.reply(Opcode::PredecessorReply, correlation_id, payload).await?;
        },
        Opcode::Keys => {
            let sender = decode_sender_node(&msg, ctx.bits);
            for chunk in ctx.callbacks.on_keys(&sender) {
                conn.reply(Opcode::KeysReply, correlation_id, chunk).await?;
            }
            conn.reply(Opcode::KeysReply, correlation_id, Bytes::new()).await?;
        },
        Opcode::Get => {
            let key = decode_key(&msg.payload)?;
            let value = ctx.callbacks.on_get(&key).unwrap_or_default();
            conn.reply(Opcode::GetReply, correlation_id, value).await?;
        },
        Opcode::Set => {
            let key = decode_key(&msg.payload)?;
            let key_len = 4 + key.to_bytes_be().len();
            let value = Bytes::copy_from_slice(&msg.payload[key_len.min(msg.payload.len())..]);
            ctx.callbacks.on_set(&key, value);
            conn.reply(Opcode::SetAck, correlation_id, Bytes::new()).await?;
        },
        Opcode::Data => {
            let sender = decode_sender_node(&msg, ctx.bits);
            ctx.callbacks.on_data(&sender, msg.payload);
        },
        _ => {},
    }
    Ok(())
}

fn decode_sender_node(msg: &crate::wire::Message, bits: u32) -> Node {
    let id = Key::from_bytes_be(&msg.sender_id, bits);
    Node::new(id, Endpoint::new(std::net::IpAddr::from([0, 0, 0, 0]), 0))
}

async fn run_http_loop(
    state: SharedState,
    settings: Settings,
    callbacks: Arc<dyn DhtCallbacks>,
    mut new_conn_rx: tokio::sync::mpsc::UnboundedReceiver<(Arc<tokio::net::TcpStream>, Endpoint)>,
) {
    let mut loop_: EventLoop<SharedState> = EventLoop::new(state);
    let timeout = settings.idle_timeout;
    loop {
        tokio::select! {
            Some((stream, endpoint)) = new_conn_rx.recv() => {
                let handler = ConnectionHandler::new(endpoint, settings.clone(), stream.clone(), Box::new(HttpApi { callbacks: callbacks.clone() }));
                loop_.add(Some(stream), Interest::Readable, timeout, Box::new(handler));
            }
            _ = loop_.turn() => {}
        }
    }
}

/// The HTTP-facing view of the DHT store: `GET /get/<hex>`, `PUT
/// /set/<hex>` and `GET /status`.
struct HttpApi {
    callbacks: Arc<dyn DhtCallbacks>,
}

impl RequestHandler<SharedState> for HttpApi {
    fn on_request(&mut self, _target: &Endpoint, request: &ParsedRequest, storage: &mut SharedState) -> Response {
        let path = request.path.as_str();
        let method = request.method.as_str();

        if method == "GET" && path == "/status" {
            // `on_request` runs synchronously inside the event loop's
            // readiness callback, so it cannot `.await` the shared lock;
            // under contention with the maintenance tasks it answers 503
            // rather than stall the whole connection handler.
            return match storage.try_lock() {
                Ok(node) => Response::text(
                    200,
                    "OK",
                    format!("self={}\nsuccessor={}\n", node.overlay.self_node, node.overlay.successor()),
                ),
                Err(_) => Response::text(503, "Service Unavailable", &b""[..]),
            };
        }

        if method == "GET"
            && let Some(hex_key) = path.strip_prefix("/get/")
        {
            let Ok(bytes) = hex::decode(hex_key) else { return Response::bad_request("invalid hex key") };
            let bits = (bytes.len() as u32) * 8;
            let key = Key::from_bytes_be(&bytes, bits);
            return match self.callbacks.on_get(&key) {
                Some(v) => Response::text(200, "OK", v),
                None => Response::not_found(),
            };
        }

        if method == "PUT"
            && let Some(hex_key) = path.strip_prefix("/set/")
        {
            let Ok(bytes) = hex::decode(hex_key) else { return Response::bad_request("invalid hex key") };
            let bits = (bytes.len() as u32) * 8;
            let key = Key::from_bytes_be(&bytes, bits);
            self.callbacks.on_set(&key, request.body.clone());
            return Response::text(200, "OK", &b""[..]);
        }

        Response::not_found()
    }
}
