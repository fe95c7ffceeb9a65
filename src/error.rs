// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Error and terminal-report types.
//!
//! Transport/bind/config failures flow as [`anyhow::Error`] the way the
//! teacher's `ClientConnection`/`Pool` report them to callers. Malformed
//! wire data is a typed [`WireError`] so the dispatcher can distinguish it
//! from a plain I/O failure. [`ReportCode`] is not an error type at all —
//! it is the terminal status delivered to a pending RPC's `OnEnd`
//! continuation.

use thiserror::Error;

/// Failures while decoding or validating a DHT wire message.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("truncated message: need at least {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("payload exceeds configured maximum: {len} > {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("correlation id mismatch: expected reply to {expected}, got {got}")]
    CorrelationMismatch { expected: u64, got: u64 },
}

/// Non-growable buffer overflow.
#[derive(Debug, Error)]
#[error("capacity exceeded: requested {requested}, free {free}")]
pub struct CapacityExceeded {
    pub requested: usize,
    pub free: usize,
}

/// Terminal status delivered to a pending RPC's `OnEnd` continuation.
///
/// Exactly one of these fires per dispatched RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCode {
    /// The RPC completed and its `OnEnd` was invoked by the caller.
    Normal,
    /// The pending table's deadline elapsed before `End` was called.
    Timeout,
    /// The transport reported hangup/reset/connect-refused.
    PeerUnreachable,
    /// A reply arrived but failed to parse or validate.
    MalformedResponse,
    /// The caller (or a shutdown) cancelled the RPC before completion.
    Cancelled,
}

impl ReportCode {
    /// `true` for everything except the nominal outcome.
    pub fn is_failure(self) -> bool {
        !matches!(self, ReportCode::Normal)
    }
}

impl std::fmt::Display for ReportCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportCode::Normal => "Normal",
            ReportCode::Timeout => "Timeout",
            ReportCode::PeerUnreachable => "PeerUnreachable",
            ReportCode::MalformedResponse => "MalformedResponse",
            ReportCode::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}
