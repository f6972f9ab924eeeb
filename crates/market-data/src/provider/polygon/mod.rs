//! Polygon.io daily aggregates provider.
//!
//! Endpoint: `GET /v2/aggs/ticker/{ticker}/range/1/day/{from}/{to}`
//! Response shape: `{"ticker": "NVDA", "results": [{"t": ..., "o": ..., ...}], ...}`

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use super::normalize_base_url;
use crate::client::FetchClient;
use crate::errors::MarketDataError;
use crate::models::AggregateBar;

pub const PROVIDER_ID: &str = "POLYGON";

const BASE_URL: &str = "https://api.polygon.io";

/// Maximum number of bars requested per call. The API is not paginated here.
const RESULT_LIMIT: u32 = 120;

pub struct PolygonProvider {
    client: FetchClient,
    base_url: String,
}

impl PolygonProvider {
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// Builds the daily aggregates URL for `[start, end]`, both inclusive.
    pub fn daily_aggregates_url(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        api_key: &str,
    ) -> String {
        format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}?adjusted=true&sort=asc&limit={}&apiKey={}",
            self.base_url,
            urlencoding::encode(ticker),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            RESULT_LIMIT,
            urlencoding::encode(api_key),
        )
    }

    /// Fetches adjusted daily bars for `ticker`, oldest first.
    ///
    /// Bars that cannot be decoded are returned as empty bars so the caller
    /// still sees (and can count) them.
    pub async fn get_daily_aggregates(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        api_key: Option<&str>,
    ) -> Result<Vec<AggregateBar>, MarketDataError> {
        let api_key = api_key.unwrap_or_else(|| {
            warn!("No Polygon API key configured for {}", ticker);
            ""
        });
        let url = self.daily_aggregates_url(ticker, start, end, api_key);

        let body = self.client.fetch_json(&url).await?;
        let bars = Self::parse_results(body)?;

        debug!(
            "Polygon returned {} bars for {} ({} to {})",
            bars.len(),
            ticker,
            start,
            end
        );
        Ok(bars)
    }

    fn parse_results(body: Value) -> Result<Vec<AggregateBar>, MarketDataError> {
        let results = match body {
            Value::Object(mut map) => map.remove("results"),
            _ => None,
        };

        let Some(Value::Array(items)) = results else {
            return Err(MarketDataError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: "missing 'results' array".to_string(),
            });
        };

        Ok(items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<AggregateBar>(item).unwrap_or_else(|e| {
                    debug!("Undecodable Polygon bar: {}", e);
                    AggregateBar::default()
                })
            })
            .collect())
    }
}
