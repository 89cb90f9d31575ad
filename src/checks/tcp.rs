//! TCP connect check.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpStream;

use super::Check;

/// TCP connect check. Passes when a connection to `host:port` opens
/// within the timeout.
pub struct TcpCheck {
    target: String,
    timeout: Duration,
}

impl TcpCheck {
    pub fn new(target: &str, timeout: Duration) -> Self {
        Self {
            target: target.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Check for TcpCheck {
    async fn run(&self) -> Result<()> {
        let connect = TcpStream::connect(&self.target);
        tokio::time::timeout(self.timeout, connect)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "connect to {} timed out after {}",
                    self.target,
                    humantime::format_duration(self.timeout)
                )
            })?
            .with_context(|| format!("connect to {} failed", self.target))?;
        Ok(())
    }
}
