//! HTTP check -- GET the target and expect a 2xx.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::Check;

/// HTTP GET check. Passes when the target answers with a 2xx status.
pub struct HttpCheck {
    client: Client,
    url: String,
}

impl HttpCheck {
    pub fn new(target: &str, timeout: Duration) -> Result<Self> {
        let url = normalize_url(target);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, url })
    }
}

/// Bare host[:port] targets get an http:// scheme prepended.
fn normalize_url(target: &str) -> String {
    if target.starts_with("http") {
        target.to_string()
    } else {
        format!("http://{target}")
    }
}

#[async_trait::async_trait]
impl Check for HttpCheck {
    async fn run(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "GET {} returned {}", self.url, status);
        Ok(())
    }
}
