//! Scripted transport for tests in this and downstream crates.
//!
//! Enabled for dependents through the `test-util` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{HttpResponse, HttpTransport};
use crate::errors::MarketDataError;

/// Transport that replays canned responses and records requested URLs.
///
/// Once the script is exhausted every request fails with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, MarketDataError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse, MarketDataError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers each request with `200 OK` and the next body.
    pub fn with_bodies<I, S>(bodies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            bodies
                .into_iter()
                .map(|body| Ok(HttpResponse::ok(body)))
                .collect(),
        )
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, MarketDataError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
            .unwrap_or_else(|| Err(MarketDataError::Transport("script exhausted".into())))
    }
}

/// A `429 Too Many Requests` answer.
pub fn rate_limited(retry_after: Option<&str>) -> Result<HttpResponse, MarketDataError> {
    Ok(HttpResponse {
        status: 429,
        retry_after: retry_after.map(str::to_string),
        body: String::new(),
    })
}
