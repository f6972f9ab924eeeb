//! Frankfurter exchange-rate provider.
//!
//! Endpoint: `GET /v1/{from}..?base={CCY}` (open-ended time series up to today)
//! Response shape: `{"base": "USD", "start_date": ..., "rates": {"2025-03-03": {"ILS": 3.6, ...}}}`

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use super::normalize_base_url;
use crate::client::FetchClient;
use crate::errors::MarketDataError;
use crate::models::DailyRates;

pub const PROVIDER_ID: &str = "FRANKFURTER";

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

pub struct FrankfurterProvider {
    client: FetchClient,
    base_url: String,
}

impl FrankfurterProvider {
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

    pub fn time_series_url(&self, base_currency: &str, start: NaiveDate) -> String {
        format!(
            "{}/{}..?base={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            urlencoding::encode(base_currency),
        )
    }

    /// Fetches every daily rate set from `start` to the present for `base_currency`.
    pub async fn get_time_series(
        &self,
        base_currency: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyRates>, MarketDataError> {
        let url = self.time_series_url(base_currency, start);
        let body = self.client.fetch_json(&url).await?;
        let days = Self::parse_rates(body)?;

        debug!(
            "Frankfurter returned {} days for base {} since {}",
            days.len(),
            base_currency,
            start
        );
        Ok(days)
    }

    fn parse_rates(body: Value) -> Result<Vec<DailyRates>, MarketDataError> {
        let rates = match body {
            Value::Object(mut map) => map.remove("rates"),
            _ => None,
        };

        let Some(Value::Object(by_date)) = rates else {
            return Err(MarketDataError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: "missing 'rates' object".to_string(),
            });
        };

        Ok(by_date
            .into_iter()
            .map(|(date, day)| {
                let rates = match day {
                    Value::Object(targets) => targets
                        .into_iter()
                        .map(|(currency, rate)| (currency, rate.as_f64()))
                        .collect(),
                    _ => BTreeMap::new(),
                };
                DailyRates { date, rates }
            })
            .collect())
    }
}
