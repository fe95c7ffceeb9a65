// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Base64 codec used by the REPL to render opaque `Set`/`Get` payloads
//! for human display.

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text).context("invalid base64 input")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let original = b"Hello there, Chord ring";
        let encoded = encode(original);
        assert_eq!(decode(&encoded).expect("valid"), original);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("not valid base64!!").is_err());
    }
}
