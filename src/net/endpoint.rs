// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `Endpoint`: an IPv4 or IPv6 address plus port, carrying flow/scope for
//! v6. Always resolvable into a flat [`std::net::SocketAddr`] of known
//! length, preserving family, port (network byte order is `SocketAddr`'s
//! job) and, for v6, flow and scope.

use std::{
    fmt,
    net::{IpAddr, SocketAddr, SocketAddrV4, SocketAddrV6},
    str::FromStr,
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// A peer address: IPv4/IPv6 address, port, and (for v6 only) flow/scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: IpAddr,
    pub port: u16,
    /// IPv6 flow label; ignored for v4.
    #[serde(default)]
    pub flow: u32,
    /// IPv6 scope id; ignored for v4.
    #[serde(default)]
    pub scope: u32,
}

impl Endpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            address,
            port,
            flow: 0,
            scope: 0,
        }
    }

    pub fn with_v6_fields(address: IpAddr, port: u16, flow: u32, scope: u32) -> Self {
        Self {
            address,
            port,
            flow,
            scope,
        }
    }

    /// Resolves to a flat, fixed-length socket address structure.
    pub fn to_socket_addr(self) -> SocketAddr {
        match self.address {
            IpAddr::V4(v4) => SocketAddr::V4(SocketAddrV4::new(v4, self.port)),
            IpAddr::V6(v6) => {
                SocketAddr::V6(SocketAddrV6::new(v6, self.port, self.flow, self.scope))
            },
        }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Endpoint::new(IpAddr::V4(*v4.ip()), v4.port()),
            SocketAddr::V6(v6) => Endpoint::with_v6_fields(
                IpAddr::V6(*v6.ip()),
                v6.port(),
                v6.flowinfo(),
                v6.scope_id(),
            ),
        }
    }
}

impl FromStr for Endpoint {
    type Err = anyhow::Error;

    /// Accepts dotted-quad `address:port` and bracketed `[address]:port`
    /// (v6) forms.
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Endpoint::from(addr));
        }
        let (host, port) = s
            .rsplit_once(':')
            .with_context(|| format!("endpoint {s:?} is missing a port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port: u16 = port
            .parse()
            .with_context(|| format!("endpoint {s:?} has an invalid port"))?;
        let address: IpAddr = host
            .parse()
            .with_context(|| format!("endpoint {s:?} has an unparseable address"))?;
        Ok(Endpoint::new(address, port))
    }
}

impl TryFrom<&str> for Endpoint {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V4(v4) => write!(f, "{v4}:{}", self.port),
            IpAddr::V6(v6) => write!(f, "[{v6}]:{}", self.port),
        }
    }
}

/// Parses `s` or returns a descriptive error, used by the `--bootstrap` CLI
/// flag and the REPL's `endpoint` command.
pub fn parse(s: &str) -> Result<Endpoint> {
    match s.parse::<Endpoint>() {
        Ok(e) => Ok(e),
        Err(e) => bail!("invalid endpoint {s:?}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ipv4() {
        let ep: Endpoint = "127.0.0.1:7000".parse().expect("valid v4 endpoint");
        assert_eq!(ep.to_string(), "127.0.0.1:7000");
        assert_eq!(ep.to_socket_addr().port(), 7000);
    }

    #[test]
    fn round_trips_ipv6_with_brackets() {
        let ep: Endpoint = "[::1]:7000".parse().expect("valid v6 endpoint");
        assert_eq!(ep.port, 7000);
        assert!(matches!(ep.address, IpAddr::V6(_)));
    }

    #[test]
    fn rejects_missing_port() {
        assert!(parse("127.0.0.1").is_err());
    }

    #[test]
    fn preserves_v6_flow_and_scope_through_socket_addr() {
        let ep = Endpoint::with_v6_fields("fe80::1".parse().expect("valid v6 literal"), 9, 7, 3);
        let sa = ep.to_socket_addr();
        match sa {
            SocketAddr::V6(v6) => {
                assert_eq!(v6.flowinfo(), 7);
                assert_eq!(v6.scope_id(), 3);
            },
            SocketAddr::V4(_) => panic!("expected v6"),
        }
    }
}
