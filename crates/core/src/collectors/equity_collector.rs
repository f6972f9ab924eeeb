use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use fincollect_market_data::{AggregateBar, PolygonProvider};

use super::collector_traits::{Collector, RowError};
use crate::constants::EQUITY_BASE_CURRENCY;
use crate::errors::Result;
use crate::records::{Record, StockRecord};
use crate::sources::SourceConfig;
use crate::utils::number_utils::decimal_from_f64;
use crate::utils::time_utils::date_from_epoch_millis;

/// A daily bar with its fields renamed and the ticker attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockRow {
    pub timestamp_ms: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub stock_ticker: String,
}

impl StockRow {
    fn from_bar(bar: AggregateBar, ticker: &str) -> Self {
        Self {
            timestamp_ms: bar.timestamp_ms,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            stock_ticker: ticker.to_string(),
        }
    }
}

/// Collects daily equity bars for the ticker in `url_additional`.
pub struct EquityCollector {
    provider: PolygonProvider,
}

impl EquityCollector {
    pub fn new(provider: PolygonProvider) -> Self {
        Self { provider }
    }

    fn ticker(config: &SourceConfig) -> String {
        config.url_additional.trim().to_uppercase()
    }
}

#[async_trait]
impl Collector for EquityCollector {
    type Row = StockRow;

    async fn get_raw_data(
        &self,
        config: &SourceConfig,
        since: DateTime<Utc>,
    ) -> Result<Vec<StockRow>> {
        let ticker = Self::ticker(config);
        let start = since.date_naive();
        let end = Utc::now().date_naive();

        let bars = self
            .provider
            .get_daily_aggregates(&ticker, start, end, config.token.as_deref())
            .await?;

        Ok(bars
            .into_iter()
            .map(|bar| StockRow::from_bar(bar, &ticker))
            .collect())
    }

    fn process_row(
        &self,
        config: &SourceConfig,
        row: StockRow,
    ) -> std::result::Result<Record, RowError> {
        let timestamp_ms = row.timestamp_ms.ok_or(RowError::MissingField("t"))?;
        let date = date_from_epoch_millis(timestamp_ms).ok_or_else(|| RowError::InvalidValue {
            field: "t",
            value: timestamp_ms.to_string(),
        })?;

        Ok(Record::Stock(StockRecord {
            id: None,
            source_id: config.source_id,
            date,
            open: price("open", row.open)?,
            high: price("high", row.high)?,
            low: price("low", row.low)?,
            close: price("close", row.close)?,
            volume: volume(row.volume)?,
            stock_ticker: row.stock_ticker,
            base_currency: EQUITY_BASE_CURRENCY.to_string(),
        }))
    }
}

fn price(field: &'static str, value: Option<f64>) -> std::result::Result<Decimal, RowError> {
    let value = value.ok_or(RowError::MissingField(field))?;
    match decimal_from_f64(value) {
        Some(decimal) if decimal >= Decimal::ZERO => Ok(decimal),
        _ => Err(RowError::InvalidValue {
            field,
            value: value.to_string(),
        }),
    }
}

fn volume(value: Option<f64>) -> std::result::Result<i64, RowError> {
    let value = value.ok_or(RowError::MissingField("volume"))?;
    if !value.is_finite() || value < 0.0 || value >= i64::MAX as f64 {
        return Err(RowError::InvalidValue {
            field: "volume",
            value: value.to_string(),
        });
    }
    Ok(value.trunc() as i64)
}
