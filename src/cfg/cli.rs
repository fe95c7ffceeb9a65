// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Resolves a configuration path relative to the current working
/// directory before handing it to `Config::load_from_file`.
pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    abs.canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))
}

/// Command-line surface for the `chordite` binary.
#[derive(Parser, Debug)]
#[command(name = "chordite", about = "An asynchronous Chord DHT node")]
pub struct Cli {
    /// Path to the node's YAML configuration file.
    pub config: String,

    /// Overrides `identity.bits` from the config file.
    #[arg(long)]
    pub bits: Option<u32>,

    /// Bootstraps against an existing ring member instead of starting a new
    /// one (`host:port`).
    #[arg(long)]
    pub bootstrap: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_cwd() {
        let here = resolve_config_path(".").expect("cwd always resolves");
        assert!(here.is_absolute());
    }

    #[test]
    fn rejects_missing_path() {
        assert!(resolve_config_path("./does-not-exist-xyz").is_err());
    }
}
