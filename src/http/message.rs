// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Parsed request / response value types for the HTTP/1.x connection
//! handler. Parsing itself is delegated to `httparse`, the crate
//! `hyper`'s own HTTP/1 connection code builds on, rather than a
//! hand-rolled tokenizer.

use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request header exceeds configured maximum")]
    HeaderTooLarge,
    #[error("request body exceeds configured maximum")]
    BodyTooLarge,
    #[error("malformed request line or headers: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub version: Version,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ParsedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The keep-alive decision, case-insensitive on the header value.
    pub fn wants_keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(v) => match self.version {
                Version::Http10 => v.eq_ignore_ascii_case("keep-alive"),
                Version::Http11 => !v.eq_ignore_ascii_case("close"),
            },
            None => self.version == Version::Http11,
        }
    }
}

/// Attempts to parse one HTTP request from `buf`. Returns `Ok(None)` when
/// more bytes are needed, mirroring [`crate::wire::Message::try_decode`]'s
/// incomplete-frame convention.
pub fn parse_request(
    buf: &[u8],
    max_header_size: usize,
    max_body_size: usize,
) -> Result<Option<(ParsedRequest, usize)>, HttpError> {
    if buf.len() > max_header_size && !has_header_terminator(buf, max_header_size) {
        return Err(HttpError::HeaderTooLarge);
    }

    let mut header_storage = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut header_storage);
    let status = req
        .parse(buf)
        .map_err(|e| HttpError::Malformed(e.to_string()))?;

    let header_len = match status {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(None),
    };

    let version = match req.version {
        Some(0) => Version::Http10,
        Some(1) => Version::Http11,
        _ => return Err(HttpError::Malformed("unsupported HTTP version".into())),
    };

    let headers: Vec<(String, String)> = req
        .headers
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    if content_length > max_body_size {
        return Err(HttpError::BodyTooLarge);
    }

    let total_len = header_len + content_length;
    if buf.len() < total_len {
        return Ok(None);
    }

    let parsed = ParsedRequest {
        method: req.method.unwrap_or("GET").to_string(),
        path: req.path.unwrap_or("/").to_string(),
        version,
        headers,
        body: Bytes::copy_from_slice(&buf[header_len..total_len]),
    };
    Ok(Some((parsed, total_len)))
}

fn has_header_terminator(buf: &[u8], within: usize) -> bool {
    let window = &buf[..buf.len().min(within.saturating_add(4))];
    window.windows(4).any(|w| w == b"\r\n\r\n")
}

/// The body of an outgoing response: either already-in-memory bytes, or a
/// file whose contents are streamed (optionally via zero-copy sendfile)
/// without being read into user-space buffers up front.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Bytes(Bytes),
    File { path: PathBuf, len: u64 },
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl Response {
    pub fn text(status: u16, reason: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: reason.to_string(),
            headers: Vec::new(),
            body: ResponseBody::Bytes(body.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found", &b"not found"[..])
    }

    pub fn bad_request(reason: &str) -> Self {
        Self::text(400, reason, Bytes::new())
    }
}
