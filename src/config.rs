//! Runtime configuration assembled from command-line flags.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::gem::Repository;

pub const DEFAULT_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validated gateway configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream repositories, highest priority first.
    pub repositories: Vec<Repository>,
    pub listen: SocketAddr,
    pub timeout: Duration,
}

impl Config {
    /// Parses repository URLs in the order given and validates the rest.
    pub fn new(repos: &[String], addr: IpAddr, port: u16, timeout_secs: u64) -> Result<Self> {
        let repositories = repos
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| {
                r.parse::<Repository>()
                    .with_context(|| format!("Invalid --repo value: {}", r))
            })
            .collect::<Result<Vec<_>>>()?;

        if repositories.is_empty() {
            anyhow::bail!("Need at least one repository specified (use --repo <URL>)");
        }
        if timeout_secs == 0 {
            anyhow::bail!("--timeout must be greater than zero");
        }

        Ok(Self {
            repositories,
            listen: SocketAddr::new(addr, port),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
