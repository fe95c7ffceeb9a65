// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{cfg::enums::Digest, net::endpoint::Endpoint};

/// Every operator-configurable knob the node reads at startup.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Key bit-width, seed and digest used to derive this node's Id.
    pub identity: IdentityConfig,
    /// Local address the event loop binds and listens on.
    pub listen: Endpoint,
    /// Periods and deadlines governing the Chord maintenance tasks.
    pub overlay: OverlayConfig,
    /// Growth policy for the per-connection byte queues.
    pub buffers: BuffersConfig,
    /// Limits and timeouts of the shared HTTP/1.x connection handler.
    pub http: HttpConfig,
    /// Implementation-only settings outside the wire protocol.
    pub runtime: RuntimeConfig,
}

/// Identity parameters used to derive (or fix) this node's Id.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct IdentityConfig {
    /// Width in bits of every Key on this ring. Default 32; 160 is the
    /// canonical deployment size.
    #[serde(default = "default_bits")]
    pub bits: u32,

    /// Fixed seed producing a deterministic Id (tests, reproducible demos).
    /// When absent the Id is drawn from the OS RNG.
    #[serde(default)]
    pub seed: Option<String>,

    /// Digest used to fold `seed` down to `bits` bits.
    #[serde(default)]
    pub digest: Digest,
}

fn default_bits() -> u32 {
    32
}

/// Periods and deadlines for the Chord maintenance primitives.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OverlayConfig {
    #[serde(with = "serde_secs", default = "default_period")]
    pub stabilize_period: Duration,
    #[serde(with = "serde_secs", default = "default_period")]
    pub fix_fingers_period: Duration,
    #[serde(with = "serde_secs", default = "default_period")]
    pub check_predecessor_period: Duration,
    #[serde(with = "serde_secs", default = "default_period")]
    pub rpc_deadline: Duration,
}

fn default_period() -> Duration {
    Duration::from_secs(5)
}

/// Growth policy for the per-connection [`crate::buffer::ByteQueue`]s.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BuffersConfig {
    #[serde(default = "default_buffer_size")]
    pub request_buffer_size: usize,
    #[serde(default = "default_buffer_size")]
    pub response_buffer_size: usize,
    /// Upper bound a growable queue may not exceed; `None` means unbounded.
    #[serde(default)]
    pub growth_cap: Option<usize>,
}

fn default_buffer_size() -> usize {
    8192
}

/// Settings of the HTTP/1.x connection handler.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_max_header_size")]
    pub max_header_size: usize,
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_send_file_threshold")]
    pub send_file_threshold: u64,
    pub host_name: String,
    #[serde(with = "serde_secs", default = "default_period")]
    pub timeout: Duration,
}

fn default_max_header_size() -> usize {
    8 * 1024
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_max_file_size() -> u64 {
    64 * 1024 * 1024
}

fn default_send_file_threshold() -> u64 {
    64 * 1024
}

/// Settings that govern this process but are not part of the wire
/// protocol.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Optional bind address for a remote control surface. The REPL always
    /// talks to the in-process runner directly regardless of this value.
    #[serde(default)]
    pub control_bind: Option<Endpoint>,
}

impl Config {
    /// Loads the configuration from YAML, validates it and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates cross-field invariants the config must satisfy.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(self.identity.bits > 0, "identity.bits must be >= 1");
        ensure!(
            self.identity.bits % 8 == 0,
            "identity.bits must be a multiple of 8"
        );
        ensure!(
            self.http.send_file_threshold <= self.http.max_file_size,
            "http.send_file_threshold must not exceed http.max_file_size"
        );
        ensure!(
            self.buffers.request_buffer_size > 0 && self.buffers.response_buffer_size > 0,
            "buffer sizes must be >= 1"
        );
        Ok(())
    }
}

/// Serde helpers representing `Duration` as a plain number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
identity:
  bits: 32
listen:
  address: "127.0.0.1"
  port: 7000
overlay:
  stabilize_period: 1
  fix_fingers_period: 1
  check_predecessor_period: 1
  rpc_deadline: 2
buffers:
  request_buffer_size: 4096
  response_buffer_size: 4096
http:
  host_name: "localhost"
runtime: {}
"#
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let cfg: Config = serde_yaml::from_str(minimal_yaml()).expect("valid yaml");
        assert_eq!(cfg.identity.bits, 32);
        assert_eq!(cfg.http.max_header_size, default_max_header_size());
    }

    #[test]
    fn rejects_send_file_threshold_above_max_file_size() {
        let mut cfg: Config = serde_yaml::from_str(minimal_yaml()).expect("valid yaml");
        cfg.http.max_file_size = 10;
        cfg.http.send_file_threshold = 20;
        assert!(cfg.validate_and_normalize().is_err());
    }

    #[test]
    fn rejects_non_byte_aligned_bits() {
        let mut cfg: Config = serde_yaml::from_str(minimal_yaml()).expect("valid yaml");
        cfg.identity.bits = 33;
        assert!(cfg.validate_and_normalize().is_err());
    }
}
