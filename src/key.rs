// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Fixed-width modular key arithmetic.
//!
//! A `Key` is an unsigned integer modulo `2^bits`. `bits` is configurable
//! at runtime (default 32, canonical deployment 160) rather than a const
//! generic: Rust has no stable way to size a `[u8; BITS/8]` array from a
//! computed const expression, so we carry `bits` alongside a
//! [`num_bigint::BigUint`] the way a handful of the corpus's own
//! ring/identity crates already do.

use std::{cmp::Ordering, fmt};

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

use crate::digest::DigestAlgorithm;

/// An unsigned integer modulo `2^bits`.
#[derive(Clone, Eq)]
pub struct Key {
    value: BigUint,
    bits: u32,
}

impl Key {
    /// Width in bits every key on a given ring shares.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    fn modulus(bits: u32) -> BigUint {
        BigUint::from(1u8) << bits
    }

    /// Wraps `value` modulo `2^bits`.
    pub fn new(value: BigUint, bits: u32) -> Self {
        let modulus = Self::modulus(bits);
        Self {
            value: value % modulus,
            bits,
        }
    }

    pub fn zero(bits: u32) -> Self {
        Self::new(BigUint::zero(), bits)
    }

    pub fn from_u64(value: u64, bits: u32) -> Self {
        Self::new(BigUint::from(value), bits)
    }

    /// Builds a key from a big-endian byte string, truncating or
    /// zero-extending to `bits`.
    pub fn from_bytes_be(bytes: &[u8], bits: u32) -> Self {
        Self::new(BigUint::from_bytes_be(bytes), bits)
    }

    /// Derives a key by hashing `seed` with `digest` and folding the
    /// output down to `bits` bits.
    pub fn from_digest(digest: Box<dyn DigestAlgorithm>, seed: &[u8], bits: u32) -> Self {
        let hashed = digest.digest(seed);
        Self::from_bytes_be(&hashed, bits)
    }

    /// Draws a uniformly random key on a ring of width `bits`.
    pub fn random(bits: u32) -> Self {
        let byte_len = bits.div_ceil(8) as usize;
        let mut bytes = vec![0u8; byte_len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes_be(&bytes, bits)
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        let byte_len = self.bits.div_ceil(8) as usize;
        let raw = self.value.to_bytes_be();
        let mut out = vec![0u8; byte_len.saturating_sub(raw.len())];
        out.extend_from_slice(&raw);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes_be())
    }

    /// `d(a, b) = (b - a) mod 2^N`, the clockwise ring distance from `self`
    /// to `other`.
    pub fn distance_to(&self, other: &Key) -> BigUint {
        debug_assert_eq!(self.bits, other.bits);
        let modulus = Self::modulus(self.bits);
        if other.value >= self.value {
            &other.value - &self.value
        } else {
            &modulus - (&self.value - &other.value)
        }
    }

    /// `self + 2^i mod 2^N`, used to compute finger table start points.
    pub fn add_power_of_two(&self, i: u32) -> Key {
        let offset = BigUint::from(1u8) << i;
        Key::new(&self.value + offset, self.bits)
    }

    /// `(a, b)`: true iff walking clockwise from `a` (exclusive) to `b`
    /// (exclusive) passes through `self`. `a == b` is the full ring minus
    /// `a` itself.
    pub fn in_open_interval(&self, a: &Key, b: &Key) -> bool {
        if a == b {
            return self != a;
        }
        let d_ab = a.distance_to(b);
        let d_ak = a.distance_to(self);
        d_ak > BigUint::zero() && d_ak < d_ab
    }

    /// `(a, b]`: as [`Key::in_open_interval`] but `b` is included.
    pub fn in_half_open_interval(&self, a: &Key, b: &Key) -> bool {
        self == b || self.in_open_interval(a, b)
    }

    /// Ring total order relative to `origin`: `a <ring b` iff
    /// `d(origin,a) < d(origin,b)`.
    pub fn ring_cmp_from(origin: &Key, a: &Key, b: &Key) -> Ordering {
        origin.distance_to(a).cmp(&origin.distance_to(b))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && self.value == other.value
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}/{})", self.to_hex(), self.bits)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
