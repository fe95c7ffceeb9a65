// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! DHT message framing: `{opcode, correlationId, senderId, payload}`.
//!
//! The fixed-size portion of every frame is a zero-copy [`RawHeader`]: a
//! `#[repr(C)]`, `FromBytes`/`IntoBytes` struct read straight out of the
//! connection's
//! ingress [`crate::buffer::ByteQueue`] without an intermediate copy. The
//! variable-length `senderId` and `payload` follow immediately after the
//! header, each length-prefixed by a header field.

use bytes::Bytes;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{error::WireError, wire::opcode::RawOpcode};

/// Fixed 20-byte frame header, little-endian on the wire.
#[repr(C)]
#[derive(Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RawHeader {
    opcode: RawOpcode,
    _reserved: [u8; 3],
    correlation_id: [u8; 8],
    sender_id_len: [u8; 2],
    _reserved2: [u8; 2],
    payload_len: [u8; 4],
}

pub const HEADER_LEN: usize = std::mem::size_of::<RawHeader>();

impl RawHeader {
    pub fn correlation_id(&self) -> u64 {
        u64::from_le_bytes(self.correlation_id)
    }

    pub fn sender_id_len(&self) -> usize {
        u16::from_le_bytes(self.sender_id_len) as usize
    }

    pub fn payload_len(&self) -> usize {
        u32::from_le_bytes(self.payload_len) as usize
    }
}

/// A fully decoded DHT message.
#[derive(Debug, Clone)]
pub struct Message {
    pub opcode: crate::wire::opcode::Opcode,
    pub correlation_id: u64,
    pub sender_id: Bytes,
    pub payload: Bytes,
}

impl Message {
    pub fn new(
        opcode: crate::wire::opcode::Opcode,
        correlation_id: u64,
        sender_id: Bytes,
        payload: Bytes,
    ) -> Self {
        Self {
            opcode,
            correlation_id,
            sender_id,
            payload,
        }
    }

    /// Serializes the message to its wire form.
    pub fn encode(&self, max_payload: usize) -> Result<Vec<u8>, WireError> {
        if self.payload.len() > max_payload {
            return Err(WireError::PayloadTooLarge {
                len: self.payload.len(),
                max: max_payload,
            });
        }
        let header = RawHeader {
            opcode: RawOpcode::from_raw(self.opcode as u8),
            _reserved: [0; 3],
            correlation_id: self.correlation_id.to_le_bytes(),
            sender_id_len: (self.sender_id.len() as u16).to_le_bytes(),
            _reserved2: [0; 2],
            payload_len: (self.payload.len() as u32).to_le_bytes(),
        };
        let mut out = Vec::with_capacity(HEADER_LEN + self.sender_id.len() + self.payload.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.sender_id);
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Attempts to decode one message from the front of `bytes`. Returns
    /// `Ok(None)` when `bytes` doesn't yet hold a complete frame — the
    /// caller should wait for more I/O, not treat this as an error.
    pub fn try_decode(bytes: &[u8]) -> Result<Option<(Message, usize)>, WireError> {
        if bytes.len() < HEADER_LEN {
            return Ok(None);
        }
        let header = RawHeader::read_from_bytes(&bytes[..HEADER_LEN])
            .map_err(|_| WireError::Truncated { need: HEADER_LEN, have: bytes.len() })?;
        let opcode = header
            .opcode
            .known()
            .ok_or(WireError::UnknownOpcode(header.opcode.raw()))?;

        let body_len = header.sender_id_len() + header.payload_len();
        let total = HEADER_LEN + body_len;
        if bytes.len() < total {
            return Ok(None);
        }

        let sender_id =
            Bytes::copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + header.sender_id_len()]);
        let payload = Bytes::copy_from_slice(&bytes[HEADER_LEN + header.sender_id_len()..total]);

        Ok(Some((
            Message::new(opcode, header.correlation_id(), sender_id, payload),
            total,
        )))
    }
}
