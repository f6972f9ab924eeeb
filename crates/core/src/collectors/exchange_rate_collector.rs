use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use fincollect_market_data::FrankfurterProvider;

use super::collector_traits::{Collector, RowError};
use crate::errors::Result;
use crate::records::{ExchangeRateRecord, Record};
use crate::sources::SourceConfig;
use crate::utils::number_utils::decimal_from_f64;
use crate::utils::time_utils::parse_iso_date;

/// One `(date, target currency)` pair from a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub date: String,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Option<f64>,
}

/// Collects daily rates against the base currency in `url_additional`.
pub struct ExchangeRateCollector {
    provider: FrankfurterProvider,
}

impl ExchangeRateCollector {
    pub fn new(provider: FrankfurterProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Collector for ExchangeRateCollector {
    type Row = RateRow;

    async fn get_raw_data(
        &self,
        config: &SourceConfig,
        since: DateTime<Utc>,
    ) -> Result<Vec<RateRow>> {
        let base_currency = config.url_additional.trim().to_uppercase();
        let days = self
            .provider
            .get_time_series(&base_currency, since.date_naive())
            .await?;

        let rows = days
            .into_iter()
            .flat_map(|day| {
                let base_currency = base_currency.clone();
                day.rates.into_iter().map(move |(target_currency, rate)| RateRow {
                    date: day.date.clone(),
                    base_currency: base_currency.clone(),
                    target_currency,
                    rate,
                })
            })
            .collect();
        Ok(rows)
    }

    fn process_row(
        &self,
        config: &SourceConfig,
        row: RateRow,
    ) -> std::result::Result<Record, RowError> {
        let date = parse_iso_date(&row.date).ok_or_else(|| RowError::InvalidDate(row.date.clone()))?;
        let raw = row.rate.ok_or(RowError::MissingField("rate"))?;
        let rate = match decimal_from_f64(raw) {
            Some(rate) if rate > Decimal::ZERO => rate,
            _ => {
                return Err(RowError::InvalidValue {
                    field: "rate",
                    value: raw.to_string(),
                })
            }
        };

        Ok(Record::ExchangeRate(ExchangeRateRecord {
            id: None,
            source_id: config.source_id,
            date,
            base_currency: row.base_currency,
            target_currency: row.target_currency,
            rate,
        }))
    }
}
