// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `chordite` — an asynchronous Chord DHT node with a shared HTTP/1.x
//! connection handler riding the same event loop.

pub mod buffer;
pub mod cfg;
pub mod digest;
pub mod error;
pub mod eventloop;
pub mod finger;
pub mod http;
pub mod key;
pub mod net;
pub mod node;
pub mod overlay;
pub mod pending;
pub mod repl;
pub mod rpc;
pub mod runner;
pub mod utils;
pub mod wire;
