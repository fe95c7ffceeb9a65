// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `OutEntry`: one queued response, drained from a connection handler's
//! egress queue. Large file bodies past
//! `SendFileThreshold` are sent via the kernel `sendfile(2)` primitive
//! once the handler has flushed the entry's header buffer, instead of
//! copying them through a userspace buffer first.

use std::{fs::File, io, path::Path};

#[cfg(unix)]
use std::os::fd::AsRawFd;

use bytes::Bytes;
use tokio::net::TcpStream;

use crate::{
    buffer::ByteQueue,
    http::message::{Response, ResponseBody},
};

/// One queued response: a header+body byte buffer, plus an optional file
/// tail transferred either by reading it into the buffer (small files) or
/// by `sendfile` (files over `SendFileThreshold`).
pub struct OutEntry {
    bytes: ByteQueue,
    file: Option<File>,
    file_remaining: u64,
    use_zero_copy: bool,
}

impl OutEntry {
    pub fn new(header_and_body: Vec<u8>, file: Option<File>, file_len: u64, use_zero_copy: bool) -> Self {
        let mut bytes = ByteQueue::with_capacity(header_and_body.len().max(1), true);
        let _ = bytes.add(&header_and_body);
        Self { bytes, file, file_remaining: file_len, use_zero_copy }
    }

    pub fn is_drained(&self) -> bool {
        self.bytes.is_empty() && self.file_remaining == 0
    }

    /// One write-readiness step: fill the buffer from the
    /// file when present and not zero-copy, write whatever buffer remains,
    /// then splice the zero-copy file tail if the buffer is now empty.
    /// Returns the number of bytes moved (buffer write + sendfile), 0
    /// meaning "would block".
    pub fn drain_once(&mut self, stream: &TcpStream) -> io::Result<usize> {
        let mut moved = 0;

        if !self.use_zero_copy
            && self.file.is_some()
            && self.bytes.free() > 0
            && self.file_remaining > 0
        {
            self.fill_buffer_from_file()?;
        }

        if !self.bytes.is_empty() {
            let (head, tail) = self.bytes.as_slices();
            let io_slices = [io::IoSlice::new(head), io::IoSlice::new(tail)];
            match stream.try_write_vectored(&io_slices) {
                Ok(n) => {
                    let mut discard = vec![0u8; n];
                    let _ = self.bytes.take_n(&mut discard);
                    moved += n;
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(moved),
                Err(e) => return Err(e),
            }
            return Ok(moved);
        }

        if self.use_zero_copy && self.file_remaining > 0 {
            moved += self.sendfile_once(stream)?;
        }

        Ok(moved)
    }

    fn fill_buffer_from_file(&mut self) -> io::Result<()> {
        use std::io::Read;
        let Some(file) = self.file.as_mut() else { return Ok(()) };
        let free = self.bytes.free();
        let want = free.min(self.file_remaining as usize);
        if want == 0 {
            return Ok(());
        }
        let mut chunk = vec![0u8; want];
        let n = file.read(&mut chunk)?;
        chunk.truncate(n);
        if !chunk.is_empty() {
            let _ = self.bytes.add(&chunk);
            self.file_remaining -= n as u64;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sendfile_once(&mut self, stream: &TcpStream) -> io::Result<usize> {
        let Some(file) = self.file.as_ref() else { return Ok(0) };
        let out_fd = stream.as_raw_fd();
        let in_fd = file.as_raw_fd();
        let remaining = self.file_remaining;
        let result = stream.try_io(tokio::io::Interest::WRITABLE, || {
            let count = remaining.min(1 << 20) as usize;
            let rc = unsafe { libc::sendfile(out_fd, in_fd, std::ptr::null_mut(), count) };
            if rc < 0 { Err(io::Error::last_os_error()) } else { Ok(rc as usize) }
        });
        match result {
            Ok(n) => {
                self.file_remaining -= n as u64;
                Ok(n)
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    #[cfg(not(unix))]
    fn sendfile_once(&mut self, _stream: &TcpStream) -> io::Result<usize> {
        Ok(0)
    }
}

/// Builds the `OutEntry` for a [`Response`]: sets
/// `Content-Length`, `Host`, and the `Connection` header, and marks large
/// file bodies for zero-copy transfer.
pub fn encode_response(
    response: Response,
    host_name: &str,
    keep_alive: bool,
    http10: bool,
    max_file_size: u64,
    send_file_threshold: u64,
) -> io::Result<OutEntry> {
    let (file, file_len, use_zero_copy, content_length) = match &response.body {
        ResponseBody::Bytes(b) => (None, 0u64, false, b.len() as u64),
        ResponseBody::File { path, len } => {
            let capped = (*len).min(max_file_size);
            let file = open_file(path)?;
            let zero_copy = capped > send_file_threshold;
            (Some(file), capped, zero_copy, capped)
        },
    };

    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(
        format!("HTTP/1.{} {} {}\r\n", if http10 { 0 } else { 1 }, response.status, response.reason)
            .as_bytes(),
    );
    out.extend_from_slice(format!("Host: {host_name}\r\n").as_bytes());
    out.extend_from_slice(format!("Content-Length: {content_length}\r\n").as_bytes());
    out.extend_from_slice(
        if keep_alive && http10 {
            b"Connection: keep-alive\r\n".as_slice()
        } else if !keep_alive && !http10 {
            b"Connection: close\r\n".as_slice()
        } else {
            b"".as_slice()
        },
    );
    for (k, v) in &response.headers {
        out.extend_from_slice(format!("{k}: {v}\r\n").as_bytes());
    }
    out.extend_from_slice(b"\r\n");

    if let ResponseBody::Bytes(b) = &response.body {
        out.extend_from_slice(b);
    }

    Ok(OutEntry::new(out, file, if matches!(response.body, ResponseBody::File { .. }) { file_len } else { 0 }, use_zero_copy))
}

fn open_file(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Convenience constructor for tests and the REPL's ad hoc byte payloads.
pub fn bytes_entry(bytes: Bytes) -> OutEntry {
    OutEntry::new(bytes.to_vec(), None, 0, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_response_has_no_file_tail() {
        let resp = Response::text(200, "OK", &b"hi"[..]);
        let entry =
            encode_response(resp, "localhost", true, false, 1 << 20, 1 << 16).expect("encodes");
        assert!(!entry.use_zero_copy);
        assert_eq!(entry.file_remaining, 0);
    }

    #[test]
    fn drained_entry_reports_drained() {
        let entry = bytes_entry(Bytes::new());
        assert!(entry.is_drained());
    }
}
