// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Cryptographic digest abstraction: a trait object plus a [`by_name`]
//! registry so the Id-derivation path and the REPL's `hash` command can
//! pick an algorithm at runtime instead of monomorphizing over each one.
//! [`by_name("md2")`] returns the real MD2 implementation.

mod md;
mod sha;

pub use md::{Md2, Md4, Md5};
pub use sha::{Sha1, Sha256, Sha384, Sha512};

/// A resettable cryptographic hash with a fixed, statically known output
/// length.
pub trait DigestAlgorithm: Send {
    /// Output length in bytes.
    const OUTPUT_LEN: usize;

    /// Discards any buffered input, returning to the initial state.
    fn reset(&mut self);

    /// Feeds additional bytes into the running hash.
    fn update(&mut self, bytes: &[u8]);

    /// Consumes the digest and returns the finalized output.
    fn finalize(self) -> Vec<u8>;

    /// Output length in bytes (trait-object-safe mirror of `OUTPUT_LEN`).
    fn output_len(&self) -> usize;

    /// One-shot convenience: hash `bytes` and return the digest.
    fn digest(mut self, bytes: &[u8]) -> Vec<u8>
    where Self: Sized {
        self.reset();
        self.update(bytes);
        self.finalize()
    }
}

/// Resolves a digest algorithm by its conventional name (case-insensitive).
///
/// Backs both Id derivation (`identity.digest` in configuration) and the
/// REPL's `hash <name> <text>` command.
pub fn by_name(name: &str) -> Option<Box<dyn DigestAlgorithm>> {
    match name.to_ascii_lowercase().as_str() {
        "sha1" => Some(Box::new(Sha1::new())),
        "sha256" => Some(Box::new(Sha256::new())),
        "sha384" => Some(Box::new(Sha384::new())),
        "sha512" => Some(Box::new(Sha512::new())),
        "md5" => Some(Box::new(Md5::new())),
        "md4" => Some(Box::new(Md4::new())),
        "md2" => Some(Box::new(Md2::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_is_none() {
        assert!(by_name("sha3").is_none());
    }

    #[test]
    fn md2_is_not_aliased_to_sha512() {
        let md2 = by_name("md2").expect("md2 is registered");
        let sha512 = by_name("sha512").expect("sha512 is registered");
        assert_ne!(md2.output_len(), sha512.output_len());
    }

    #[test]
    fn names_are_case_insensitive() {
        assert!(by_name("SHA1").is_some());
        assert!(by_name("Sha256").is_some());
    }
}
