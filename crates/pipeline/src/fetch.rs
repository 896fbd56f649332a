//! Serialized tile fetching over a single shared network channel.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use radar_core::{RadarError, RadarResult};

/// The single shared network channel for the catalog and tile endpoints.
///
/// The pipeline awaits each request before issuing the next, so at most
/// one request is outstanding per pipeline at any time.
#[async_trait]
pub trait TileTransport: Send + Sync {
    async fn get(&self, url: &str) -> RadarResult<Bytes>;
}

/// reqwest-backed transport with connect and request timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> RadarResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RadarError::CatalogFetch(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TileTransport for HttpTransport {
    async fn get(&self, url: &str) -> RadarResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RadarError::TileFetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RadarError::TileFetch {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        response.bytes().await.map_err(|e| RadarError::TileFetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Bounded retry with exponential delay for transient tile failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// First retry delay; doubles each retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay * 2_u32.saturating_pow(attempt)
    }
}

/// Fetch one tile with bounded retry.
///
/// After exhausting retries the tile degrades to `None` (a blank spot in
/// the mosaic) rather than failing the frame; radar imagery tolerates
/// partial degradation better than a dropped frame.
pub async fn fetch_tile(
    transport: &dyn TileTransport,
    url: &str,
    policy: &RetryPolicy,
) -> Option<Bytes> {
    let mut attempt = 0;
    loop {
        match transport.get(url).await {
            Ok(bytes) => return Some(bytes),
            Err(e) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, error = %e, "Tile fetch failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(url, error = %e, "Tile fetch failed after retries; using blank tile");
                return None;
            }
        }
    }
}
