//! Track resolver implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    resolver::{ByteStream, TrackResolver},
};
use futures_util::TryStreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for opening a download stream.
///
/// Only the request itself is retried. Once the body starts flowing,
/// failures surface to the reader.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff delay before attempt number `attempt + 1`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        (self.base_delay * factor).min(self.max_delay)
    }
}

/// Reqwest-based resolver.
///
/// Provides:
/// - Connection pooling via reqwest
/// - Retry with exponential backoff on 5xx / 429 and connect errors
/// - Streaming bodies without buffering whole tracks in memory
pub struct ReqwestTrackResolver {
    client: Client,
    policy: RetryPolicy,
}

impl ReqwestTrackResolver {
    /// Create a resolver with default client settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("midnight-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Create a resolver around a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn is_retryable(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }

    async fn open_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts.max(1) {
            debug!(attempt, max_attempts = self.policy.max_attempts, "Opening track stream");

            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let error = BridgeError::HttpStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    };
                    if !Self::is_retryable(status) {
                        return Err(error);
                    }
                    warn!(status = status.as_u16(), attempt, "Retryable HTTP status");
                    last_error = Some(error);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(error = %e, attempt, "Track stream request failed");
                    last_error = Some(BridgeError::OperationFailed(e.to_string()));
                }
                Err(e) => return Err(BridgeError::OperationFailed(e.to_string())),
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay_for(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BridgeError::OperationFailed("All retry attempts exhausted".to_string())
        }))
    }
}

#[async_trait]
impl TrackResolver for ReqwestTrackResolver {
    async fn download_stream(&self, url: String) -> Result<ByteStream> {
        let response = self.open_with_retry(&url).await?;

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = tokio_util::io::StreamReader::new(stream);

        Ok(Box::new(reader))
    }
}
