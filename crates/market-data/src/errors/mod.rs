//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching or decoding provider payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The request never produced an HTTP response (DNS, connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status other than 429.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL with credentials redacted
        url: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse response body: {0}")]
    Parse(String),

    /// The server kept answering 429 until the attempt budget ran out.
    #[error("Rate limit exceeded after {attempts} attempts: {url}")]
    RateLimitExceeded {
        /// Requested URL with credentials redacted
        url: String,
        /// Number of requests issued, all of which were rate limited
        attempts: u32,
    },

    /// The body was valid JSON but lacked the structure the provider documents.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider that returned the payload
        provider: String,
        /// What was missing or mistyped
        message: String,
    },
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest embeds the request URL, query credentials included.
        MarketDataError::Transport(err.without_url().to_string())
    }
}
