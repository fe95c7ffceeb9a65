// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

#![allow(clippy::all)]

mod integration_tests {
    pub mod common;

    pub mod http_surface;
    pub mod lone_node;
    pub mod timeout;
    pub mod two_node_ring;
}
