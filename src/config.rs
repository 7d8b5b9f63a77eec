//! Configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `DRAINKEEPER_TRAFFIC_ADDR` | `0.0.0.0:80` |
//! | `DRAINKEEPER_CONTROL_ADDR` | `0.0.0.0:8080` |
//! | `DRAINKEEPER_PRESTOP_GRACE_SECS` | `3` |
//! | `DRAINKEEPER_DEMO_WORK_MS` | `1000` |

use crate::server::DEFAULT_PRESTOP_GRACE;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const TRAFFIC_ADDR_VAR: &str = "DRAINKEEPER_TRAFFIC_ADDR";
pub const CONTROL_ADDR_VAR: &str = "DRAINKEEPER_CONTROL_ADDR";
pub const PRESTOP_GRACE_VAR: &str = "DRAINKEEPER_PRESTOP_GRACE_SECS";
pub const DEMO_WORK_VAR: &str = "DRAINKEEPER_DEMO_WORK_MS";

/// Default traffic listener
const DEFAULT_TRAFFIC_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    80,
);

/// Default control listener
const DEFAULT_CONTROL_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    8080,
);

const DEFAULT_DEMO_WORK: Duration = Duration::from_millis(1000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a valid socket address: {value:?}")]
    InvalidAddress { key: &'static str, value: String },

    #[error("{key} is not a valid whole number: {value:?}")]
    InvalidDuration { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub traffic_addr: SocketAddr,
    pub control_addr: SocketAddr,
    /// Pause applied by `/prestop` after marking not ready
    pub prestop_grace: Duration,
    /// Simulated work per request in the demo handler
    pub demo_work: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            traffic_addr: DEFAULT_TRAFFIC_ADDR,
            control_addr: DEFAULT_CONTROL_ADDR,
            prestop_grace: DEFAULT_PRESTOP_GRACE,
            demo_work: DEFAULT_DEMO_WORK,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Unset and empty variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            traffic_addr: parse_addr(TRAFFIC_ADDR_VAR, get(TRAFFIC_ADDR_VAR))?
                .unwrap_or(defaults.traffic_addr),
            control_addr: parse_addr(CONTROL_ADDR_VAR, get(CONTROL_ADDR_VAR))?
                .unwrap_or(defaults.control_addr),
            prestop_grace: parse_u64(PRESTOP_GRACE_VAR, get(PRESTOP_GRACE_VAR))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.prestop_grace),
            demo_work: parse_u64(DEMO_WORK_VAR, get(DEMO_WORK_VAR))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.demo_work),
        })
    }
}

fn parse_addr(key: &'static str, value: Option<String>) -> Result<Option<SocketAddr>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress { key, value: v })
        })
        .transpose()
}

fn parse_u64(key: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidDuration { key, value: v })
        })
        .transpose()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
