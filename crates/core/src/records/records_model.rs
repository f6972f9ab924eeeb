use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CollectionError, Result, ValidationError};

/// Storage target for a family of records.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StorageCategory {
    StockRecords,
    ExchangeRateRecords,
}

impl StorageCategory {
    pub const ALL: [StorageCategory; 2] = [
        StorageCategory::StockRecords,
        StorageCategory::ExchangeRateRecords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageCategory::StockRecords => "stock_records",
            StorageCategory::ExchangeRateRecords => "exchange_rate_records",
        }
    }
}

impl fmt::Display for StorageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageCategory {
    type Err = CollectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        StorageCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| CollectionError::UnknownCategory(s.to_string()))
    }
}

/// One daily OHLCV bar for a ticker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    /// Assigned by storage; `None` until persisted
    pub id: Option<i64>,
    pub source_id: i64,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub stock_ticker: String,
    pub base_currency: String,
}

/// Units of `target_currency` per one unit of `base_currency` on `date`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateRecord {
    pub id: Option<i64>,
    pub source_id: i64,
    pub date: NaiveDate,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Record {
    Stock(StockRecord),
    ExchangeRate(ExchangeRateRecord),
}

impl Record {
    pub fn category(&self) -> StorageCategory {
        match self {
            Record::Stock(_) => StorageCategory::StockRecords,
            Record::ExchangeRate(_) => StorageCategory::ExchangeRateRecords,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Stock(_) => "stock",
            Record::ExchangeRate(_) => "exchange rate",
        }
    }

    pub fn source_id(&self) -> i64 {
        match self {
            Record::Stock(r) => r.source_id,
            Record::ExchangeRate(r) => r.source_id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Record::Stock(r) => r.date,
            Record::ExchangeRate(r) => r.date,
        }
    }

    /// Human-readable natural key, used in logs.
    pub fn natural_key(&self) -> String {
        match self {
            Record::Stock(r) => format!("{}/{}/{}", r.source_id, r.date, r.stock_ticker),
            Record::ExchangeRate(r) => format!(
                "{}/{}/{}->{}",
                r.source_id, r.date, r.base_currency, r.target_currency
            ),
        }
    }

    /// Checks the value constraints every stored record must satisfy.
    pub fn validate(&self) -> Result<()> {
        match self {
            Record::Stock(r) => {
                require_non_empty("stock_ticker", &r.stock_ticker)?;
                require_non_empty("base_currency", &r.base_currency)?;
                for (field, value) in [
                    ("open", r.open),
                    ("high", r.high),
                    ("low", r.low),
                    ("close", r.close),
                ] {
                    if value < Decimal::ZERO {
                        return Err(invalid(format!("{} must be non-negative, got {}", field, value)));
                    }
                }
                if r.volume < 0 {
                    return Err(invalid(format!("volume must be non-negative, got {}", r.volume)));
                }
            }
            Record::ExchangeRate(r) => {
                require_non_empty("base_currency", &r.base_currency)?;
                require_non_empty("target_currency", &r.target_currency)?;
                if r.rate <= Decimal::ZERO {
                    return Err(invalid(format!("rate must be positive, got {}", r.rate)));
                }
            }
        }
        Ok(())
    }
}

impl From<StockRecord> for Record {
    fn from(record: StockRecord) -> Self {
        Record::Stock(record)
    }
}

impl From<ExchangeRateRecord> for Record {
    fn from(record: ExchangeRateRecord) -> Self {
        Record::ExchangeRate(record)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()).into());
    }
    Ok(())
}

fn invalid(message: String) -> crate::Error {
    ValidationError::InvalidInput(message).into()
}

/// Fails with `CategoryMismatch` if any record does not belong to `category`.
pub fn ensure_category(records: &[Record], category: StorageCategory) -> Result<()> {
    match records.iter().find(|r| r.category() != category) {
        Some(record) => Err(CollectionError::CategoryMismatch {
            category: category.to_string(),
            record: record.kind().to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Outcome of one reconciler call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub inserted: usize,
    pub modified: usize,
    pub failed: usize,
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted={} modified={} failed={}",
            self.inserted, self.modified, self.failed
        )
    }
}

/// Outcome of one collection run: the reconciler stats plus rows the
/// collector dropped before they reached storage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub inserted: usize,
    pub modified: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CollectStats {
    pub fn new(write: WriteStats, skipped: usize) -> Self {
        Self {
            inserted: write.inserted,
            modified: write.modified,
            failed: write.failed,
            skipped,
        }
    }

    pub fn write_stats(&self) -> WriteStats {
        WriteStats {
            inserted: self.inserted,
            modified: self.modified,
            failed: self.failed,
        }
    }
}

impl fmt::Display for CollectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped={}", self.write_stats(), self.skipped)
    }
}
