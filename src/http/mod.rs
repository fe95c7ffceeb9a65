// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Shared HTTP/1.x connection handler, riding the same event loop as the
//! DHT peer-to-peer RPC connections.

pub mod handler;
pub mod message;
pub mod out_entry;
pub mod settings;

pub use handler::{ConnectionHandler, RequestHandler};
pub use message::{ParsedRequest, Response, ResponseBody};
pub use settings::Settings;
