//! JSON fetch client with HTTP 429 backoff.
//!
//! [`FetchClient::fetch_json`] issues a GET through an [`HttpTransport`] and
//! decodes the body as JSON. A `429 Too Many Requests` answer is waited out for
//! the number of seconds in `Retry-After` (or the policy default when the header
//! is missing or not an integer) and the same URL is requested again. Once
//! [`RateLimitPolicy::max_attempts`] consecutive requests have been rate limited
//! the call fails with [`MarketDataError::RateLimitExceeded`].
//!
//! The wait suspends only the calling task; requests are issued sequentially.

mod transport;

pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, DEFAULT_REQUEST_TIMEOUT};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;

const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Query parameters whose values are never written to logs or errors.
const REDACTED_PARAMS: &[&str] = &["apiKey", "apikey", "token"];

/// How rate-limited requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Total requests allowed per call when every answer is a 429.
    pub max_attempts: u32,
    /// Wait used when `Retry-After` is absent or unparseable.
    pub default_retry_after: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_retry_after: Duration::from_secs(60),
        }
    }
}

impl RateLimitPolicy {
    /// Resolves the wait for a rate-limited response.
    pub fn wait_for(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_retry_after)
    }
}

/// Shared JSON fetcher used by every provider.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    policy: RateLimitPolicy,
}

impl FetchClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            policy: RateLimitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Fetches `url` and parses the body as JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, MarketDataError> {
        let display_url = redact_url(url);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", display_url, attempt, max_attempts);

            let response = self
                .transport
                .get(url)
                .await
                .map_err(|e| redact_error(e, url, &display_url))?;

            if response.status == STATUS_TOO_MANY_REQUESTS {
                if attempt >= max_attempts {
                    warn!(
                        "Rate limited {} times in a row, giving up on {}",
                        attempt, display_url
                    );
                    return Err(MarketDataError::RateLimitExceeded {
                        url: display_url,
                        attempts: attempt,
                    });
                }

                let wait = self.policy.wait_for(response.retry_after.as_deref());
                warn!(
                    "Rate limited on {} (attempt {}), retrying in {}s",
                    display_url,
                    attempt,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !response.is_success() {
                warn!("HTTP {} from {}", response.status, display_url);
                return Err(MarketDataError::Http {
                    status: response.status,
                    url: display_url,
                });
            }

            return serde_json::from_str(&response.body)
                .map_err(|e| MarketDataError::Parse(e.to_string()));
        }
    }
}

/// Scrubs the raw URL out of transport messages produced outside this crate.
fn redact_error(err: MarketDataError, url: &str, display_url: &str) -> MarketDataError {
    match err {
        MarketDataError::Transport(message) => {
            MarketDataError::Transport(message.replace(url, display_url))
        }
        other => other,
    }
}

/// Replaces credential query values with `***`.
pub(crate) fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if REDACTED_PARAMS.contains(&key) => format!("{}=***", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query)
}
