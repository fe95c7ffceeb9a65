// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! MD-family instances of [`super::DigestAlgorithm`]. MD2 is wired to the
//! real `md2` crate — see the module-level note in `digest::mod` about the
//! original's MD2/SHA512 aliasing bug.

use digest::Digest as _;
use md2::Md2 as RcMd2;
use md4::Md4 as RcMd4;
use md5::Md5 as RcMd5;

use super::DigestAlgorithm;

#[derive(Default)]
pub struct Md5 {
    inner: RcMd5,
}

impl Md5 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestAlgorithm for Md5 {
    const OUTPUT_LEN: usize = 16;

    fn reset(&mut self) {
        self.inner = RcMd5::default();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.inner.finalize().to_vec()
    }

    fn output_len(&self) -> usize {
        Self::OUTPUT_LEN
    }
}

#[derive(Default)]
pub struct Md4 {
    inner: RcMd4,
}

impl Md4 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestAlgorithm for Md4 {
    const OUTPUT_LEN: usize = 16;

    fn reset(&mut self) {
        self.inner = RcMd4::default();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.inner.finalize().to_vec()
    }

    fn output_len(&self) -> usize {
        Self::OUTPUT_LEN
    }
}

#[derive(Default)]
pub struct Md2 {
    inner: RcMd2,
}

impl Md2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestAlgorithm for Md2 {
    const OUTPUT_LEN: usize = 16;

    fn reset(&mut self) {
        self.inner = RcMd2::default();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.inner.finalize().to_vec()
    }

    fn output_len(&self) -> usize {
        Self::OUTPUT_LEN
    }
}
