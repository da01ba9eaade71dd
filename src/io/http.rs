use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::AssetSource;
use anyhow::{Result, bail};

/// Fetches assets and archives over HTTP(S)
pub struct HttpSource {
    client: Client,
    transferred_bytes: AtomicU64,
    max_retry: u32,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            transferred_bytes: AtomicU64::new(0),
            max_retry: 10,
        })
    }

    /// Set how many connect/timeout failures are tolerated per request
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry.max(1);
        self
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn read_all(&self, location: &str) -> Result<Vec<u8>> {
        let mut retry_count = 0;

        loop {
            match self.client.get(location).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        bail!("HTTP request for {} failed with status: {}", location, resp.status());
                    }

                    let bytes = resp.bytes().await?;
                    self.transferred_bytes
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                    tracing::debug!(url = location, bytes = bytes.len(), "fetched");

                    return Ok(bytes.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded for {}", location);
                    }
                    tracing::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
