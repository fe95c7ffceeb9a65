// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::{Context, Result};
use chordite::{
    cfg::{cli::{Cli, resolve_config_path}, config::Config, logger::init_logger},
    net::Endpoint,
    runner::{InMemoryStore, Runner},
};
use clap::Parser;
use tracing::info;

/// Single-threaded: the event loop and the maintenance tasks are all
/// cooperative `tokio` tasks sharing one reactor, never a worker pool.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger_guard = init_logger("config/logger.yaml")?;

    let mut cfg = resolve_config_path(&cli.config)
        .and_then(Config::load_from_file)
        .with_context(|| format!("loading config from {}", cli.config))?;
    if let Some(bits) = cli.bits {
        cfg.identity.bits = bits;
        cfg.validate_and_normalize()?;
    }

    let store = Arc::new(InMemoryStore::default());
    let runner = Arc::new(Runner::new(&cfg, store).context("constructing runner")?);
    info!(node = %runner.self_node(), "chordite node starting");

    if let Some(raw) = &cli.bootstrap {
        let known: Endpoint = raw
            .parse()
            .with_context(|| format!("invalid --bootstrap endpoint {raw:?}"))?;
        runner.bootstrap(known).await.context("bootstrap failed")?;
    }

    let run_handle = tokio::spawn(runner.clone().run());
    let repl_result = chordite::repl::run(runner).await;
    run_handle.abort();

    repl_result
}
