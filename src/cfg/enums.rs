// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

/// Digest algorithm used to derive a node's Id from its configured seed.
/// Mirrors `digest::by_name`'s registry one-for-one.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Digest {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Md5,
    Md4,
    Md2,
}

impl Digest {
    pub fn as_str(self) -> &'static str {
        match self {
            Digest::Sha1 => "sha1",
            Digest::Sha256 => "sha256",
            Digest::Sha384 => "sha384",
            Digest::Sha512 => "sha512",
            Digest::Md5 => "md5",
            Digest::Md4 => "md4",
            Digest::Md2 => "md2",
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Digest {
    fn default() -> Self {
        Digest::Sha1
    }
}
