// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Payload encoding for the DHT RPC opcodes: how `Key`s and `Node`s are
//! folded into the opaque `payload` byte string every
//! [`crate::wire::Message`] carries. Kept separate from `message.rs`
//! because the header framing is opcode-agnostic; only the dispatcher in
//! `rpc.rs`/`runner.rs` needs to know what each opcode's payload means.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{error::WireError, key::Key, node::Node};

pub fn encode_key(key: &Key) -> Bytes {
    let bytes = key.to_bytes_be();
    let mut out = BytesMut::with_capacity(4 + bytes.len());
    out.put_u32(key.bits());
    out.put_slice(&bytes);
    out.freeze()
}

pub fn decode_key(buf: &[u8]) -> Result<Key, WireError> {
    if buf.len() < 4 {
        return Err(WireError::Truncated { need: 4, have: buf.len() });
    }
    let mut b = buf;
    let bits = b.get_u32();
    Ok(Key::from_bytes_be(b, bits))
}

pub fn encode_node(node: &Node) -> Bytes {
    let key_bytes = encode_key(&node.id);
    let endpoint = node.endpoint.to_string();
    let mut out = BytesMut::with_capacity(4 + key_bytes.len() + 2 + endpoint.len());
    out.put_u32(key_bytes.len() as u32);
    out.put_slice(&key_bytes);
    out.put_u16(endpoint.len() as u16);
    out.put_slice(endpoint.as_bytes());
    out.freeze()
}

pub fn decode_node(buf: &[u8]) -> Result<Node, WireError> {
    let mut b = buf;
    if b.len() < 4 {
        return Err(WireError::Truncated { need: 4, have: b.len() });
    }
    let key_len = b.get_u32() as usize;
    if b.len() < key_len + 2 {
        return Err(WireError::Truncated { need: key_len + 2, have: b.len() });
    }
    let key = decode_key(&b[..key_len])?;
    b.advance(key_len);
    let ep_len = b.get_u16() as usize;
    if b.len() < ep_len {
        return Err(WireError::Truncated { need: ep_len, have: b.len() });
    }
    let endpoint_str = std::str::from_utf8(&b[..ep_len])
        .map_err(|_| WireError::CorrelationMismatch { expected: 0, got: 0 })?;
    let endpoint = endpoint_str
        .parse()
        .map_err(|_| WireError::CorrelationMismatch { expected: 0, got: 0 })?;
    Ok(Node::new(key, endpoint))
}

/// Wire encoding of [`crate::overlay::RouteDecision`]: a one-byte tag
/// (`0` = Answer, `1` = Forward) followed by the encoded node.
pub fn encode_route_decision(answer: bool, node: &Node) -> Bytes {
    let node_bytes = encode_node(node);
    let mut out = BytesMut::with_capacity(1 + node_bytes.len());
    out.put_u8(if answer { 0 } else { 1 });
    out.put_slice(&node_bytes);
    out.freeze()
}

pub fn decode_route_decision(buf: &[u8]) -> Result<(bool, Node), WireError> {
    if buf.is_empty() {
        return Err(WireError::Truncated { need: 1, have: 0 });
    }
    let answer = buf[0] == 0;
    let node = decode_node(&buf[1..])?;
    Ok((answer, node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips() {
        let key = Key::from_u64(42, 32);
        let encoded = encode_key(&key);
        let decoded = decode_key(&encoded).expect("decodes");
        assert_eq!(decoded, key);
    }

    #[test]
    fn node_round_trips() {
        let node = Node::new(Key::from_u64(7, 16), "127.0.0.1:9001".parse().expect("valid"));
        let encoded = encode_node(&node);
        let decoded = decode_node(&encoded).expect("decodes");
        assert_eq!(decoded.id, node.id);
        assert_eq!(decoded.endpoint, node.endpoint);
    }

    #[test]
    fn route_decision_round_trips() {
        let node = Node::new(Key::from_u64(9, 16), "127.0.0.1:9002".parse().expect("valid"));
        let encoded = encode_route_decision(true, &node);
        let (answer, decoded) = decode_route_decision(&encoded).expect("decodes");
        assert!(answer);
        assert_eq!(decoded.id, node.id);
    }
}
