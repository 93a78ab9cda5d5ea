//! Target reachability check run before a suite

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Polls the target site until it answers with a success status
pub struct TargetProbe {
    url: String,
    timeout: Duration,
    interval: Duration,
    use_proxy: bool,
}

impl TargetProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            interval: Duration::from_millis(500),
            use_proxy: true,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Connect directly, ignoring proxy environment variables
    pub fn direct(mut self) -> Self {
        self.use_proxy = false;
        self
    }

    /// Wait for the target to respond, returning the number of attempts
    pub async fn wait_reachable(&self) -> E2eResult<usize> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(5));
        if !self.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < self.timeout {
            attempts += 1;

            match client.get(&self.url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!("Target {} is reachable ({} attempt(s))", self.url, attempts);
                    return Ok(attempts);
                }
                Ok(resp) => {
                    warn!("Target {} returned {}", self.url, resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} ...", self.url);
                    }
                    if !e.is_connect() {
                        warn!("Reachability check error: {}", e);
                    }
                }
            }

            sleep(self.interval).await;
        }

        Err(E2eError::TargetUnreachable {
            url: self.url.clone(),
            attempts,
        })
    }
}
