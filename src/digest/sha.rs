// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! SHA-family instances of [`super::DigestAlgorithm`], delegating to the
//! `sha1`/`sha2` crates rather than hand-rolled compression functions.

use sha1::Sha1 as RcSha1;
use sha2::{Digest as _, Sha256 as RcSha256, Sha384 as RcSha384, Sha512 as RcSha512};

use super::DigestAlgorithm;

macro_rules! sha_wrapper {
    ($name:ident, $inner:ty, $len:expr) => {
        #[derive(Default)]
        pub struct $name {
            inner: $inner,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl DigestAlgorithm for $name {
            const OUTPUT_LEN: usize = $len;

            fn reset(&mut self) {
                self.inner = <$inner>::default();
            }

            fn update(&mut self, bytes: &[u8]) {
                sha2::Digest::update(&mut self.inner, bytes);
            }

            fn finalize(self) -> Vec<u8> {
                sha2::Digest::finalize(self.inner).to_vec()
            }

            fn output_len(&self) -> usize {
                $len
            }
        }
    };
}

#[derive(Default)]
pub struct Sha1 {
    inner: RcSha1,
}

impl Sha1 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestAlgorithm for Sha1 {
    const OUTPUT_LEN: usize = 20;

    fn reset(&mut self) {
        self.inner = RcSha1::default();
    }

    fn update(&mut self, bytes: &[u8]) {
        sha1::Digest::update(&mut self.inner, bytes);
    }

    fn finalize(self) -> Vec<u8> {
        sha1::Digest::finalize(self.inner).to_vec()
    }

    fn output_len(&self) -> usize {
        Self::OUTPUT_LEN
    }
}

sha_wrapper!(Sha256, RcSha256, 32);
sha_wrapper!(Sha384, RcSha384, 48);
sha_wrapper!(Sha512, RcSha512, 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_empty_input_has_expected_length() {
        let out = Sha256::new().digest(b"");
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn sha1_matches_known_vector() {
        let out = Sha1::new().digest(b"abc");
        assert_eq!(hex::encode(out), "a9993e364706816aba3e25717850c26c9cd0d89");
    }
}
