// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The HTTP/1.x connection handler: Reading → Dispatching → Enqueue →
//! Writing per request, with backpressure-driven interest toggling and
//! idle-timeout eviction — a small, explicit step function invoked once
//! per readiness wake rather than a hand-unrolled callback chain.

use std::{collections::VecDeque, sync::Arc};

use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::{
    buffer::ByteQueue,
    eventloop::{EntryHandler, Handle, Interest},
    http::{
        message::{HttpError, ParsedRequest, Response, parse_request},
        out_entry::{OutEntry, encode_response},
        settings::Settings,
    },
    net::Endpoint,
};

/// Produces the response for one fully-parsed request. Implemented by the
/// DHT runner (`runner.rs`) to route `/keys`, `/get`, `/set` and friends
/// into the overlay/pending-table machinery.
pub trait RequestHandler<S>: Send {
    fn on_request(&mut self, target: &Endpoint, request: &ParsedRequest, storage: &mut S) -> Response;
}

/// Per-connection state machine. One instance is registered with the
/// event loop per accepted/dialed socket.
pub struct ConnectionHandler<S> {
    target: Endpoint,
    settings: Settings,
    stream: Arc<TcpStream>,
    ingress: ByteQueue,
    egress: VecDeque<OutEntry>,
    should_close: bool,
    read_half_shut: bool,
    request_handler: Box<dyn RequestHandler<S>>,
}

impl<S> ConnectionHandler<S> {
    pub fn new(
        target: Endpoint,
        settings: Settings,
        stream: Arc<TcpStream>,
        request_handler: Box<dyn RequestHandler<S>>,
    ) -> Self {
        let request_buffer_size = settings.request_buffer_size;
        Self {
            target,
            settings,
            stream,
            ingress: ByteQueue::with_capacity(request_buffer_size, false),
            egress: VecDeque::new(),
            should_close: false,
            read_half_shut: false,
            request_handler,
        }
    }

    /// The readiness interest this connection currently wants: `In` while
    /// more requests are expected, `Out` while egress is non-empty, both
    /// when reading could still produce pipelined requests and a response
    /// is still draining.
    pub fn desired_interest(&self) -> Interest {
        match (!self.read_half_shut, !self.egress.is_empty()) {
            (true, true) => Interest::Both,
            (true, false) => Interest::Readable,
            (false, true) => Interest::Writable,
            (false, false) => Interest::Readable,
        }
    }

    fn handle_readable(&mut self, storage: &mut S) {
        let mut scratch = [0u8; 8192];
        loop {
            match self.stream.try_read(&mut scratch) {
                Ok(0) => {
                    self.should_close = true;
                    self.read_half_shut = true;
                    break;
                },
                Ok(n) => {
                    if self.ingress.add(&scratch[..n]).is_err() {
                        warn!("ingress buffer overflow; closing connection");
                        self.should_close = true;
                        self.read_half_shut = true;
                        break;
                    }
                    if n < scratch.len() {
                        break;
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!(error = %e, "connection read error");
                    self.should_close = true;
                    self.read_half_shut = true;
                    break;
                },
            }
        }
        self.drain_requests(storage);
    }

    fn drain_requests(&mut self, storage: &mut S) {
        loop {
            let (head, tail) = self.ingress.as_slices();
            let contiguous: std::borrow::Cow<[u8]> = if tail.is_empty() {
                std::borrow::Cow::Borrowed(head)
            } else {
                let mut joined = Vec::with_capacity(head.len() + tail.len());
                joined.extend_from_slice(head);
                joined.extend_from_slice(tail);
                std::borrow::Cow::Owned(joined)
            };

            match parse_request(&contiguous, self.settings.max_header_size, self.settings.max_body_size) {
                Ok(Some((request, consumed))) => {
                    let mut discard = vec![0u8; consumed];
                    let _ = self.ingress.take_n(&mut discard);
                    self.dispatch(request, storage);
                },
                Ok(None) => break,
                Err(e) => {
                    self.enqueue_error(&e);
                    self.ingress.clear();
                    break;
                },
            }
        }
    }

    fn dispatch(&mut self, request: ParsedRequest, storage: &mut S) {
        let http10 = request.version == crate::http::message::Version::Http10;
        let keep_alive = request.wants_keep_alive();
        let response = self.request_handler.on_request(&self.target, &request, storage);
        self.should_close = !keep_alive;
        self.enqueue(response, keep_alive, http10);
    }

    fn enqueue_error(&mut self, err: &HttpError) {
        let response = match err {
            HttpError::HeaderTooLarge => Response::text(431, "Request Header Fields Too Large", &b""[..]),
            HttpError::BodyTooLarge => Response::text(413, "Payload Too Large", &b""[..]),
            HttpError::Malformed(_) => Response::bad_request("Bad Request"),
        };
        self.should_close = true;
        self.enqueue(response, false, false);
    }

    fn enqueue(&mut self, response: Response, keep_alive: bool, http10: bool) {
        match encode_response(
            response,
            &self.settings.host_name,
            keep_alive,
            http10,
            self.settings.max_file_size,
            self.settings.send_file_threshold,
        ) {
            Ok(entry) => self.egress.push_back(entry),
            Err(e) => {
                warn!(error = %e, "failed to encode response, closing connection");
                self.should_close = true;
            },
        }
    }

    fn handle_writable(&mut self) {
        while let Some(entry) = self.egress.front_mut() {
            match entry.drain_once(&self.stream) {
                Ok(0) => break,
                Ok(_) => {
                    if entry.is_drained() {
                        self.egress.pop_front();
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!(error = %e, "connection write error");
                    self.should_close = true;
                    self.egress.clear();
                    break;
                },
            }
        }
    }
}

impl<S: Send> EntryHandler<S> for ConnectionHandler<S> {
    fn on_ready(&mut self, _handle: Handle, readable: bool, writable: bool, storage: &mut S) {
        if readable {
            self.handle_readable(storage);
        }
        if writable {
            self.handle_writable();
        }
    }

    fn on_timeout(&mut self, _handle: Handle, _storage: &mut S) {
        self.should_close = true;
        self.egress.clear();
    }

    fn should_remove(&self) -> bool {
        self.should_close && self.egress.is_empty()
    }

    fn interest(&self) -> Interest {
        self.desired_interest()
    }
}
