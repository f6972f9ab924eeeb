//! Database models for stock and exchange-rate records.
//!
//! Prices and rates are stored as decimal strings and dates as `YYYY-MM-DD`,
//! so text ordering matches chronological ordering.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fincollect_core::constants::DATE_FORMAT;
use fincollect_core::errors::{Error, ValidationError};
use fincollect_core::records::{ExchangeRateRecord, StockRecord};
use fincollect_core::utils::time_utils::format_date;

/// Database model for a stored equity bar
#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::stock_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockRecordDB {
    pub id: i64,
    pub source_id: i64,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub stock_ticker: String,
    pub base_currency: String,
}

/// Insert form of [`StockRecordDB`]; the id is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::stock_records)]
pub struct NewStockRecordDB {
    pub source_id: i64,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub stock_ticker: String,
    pub base_currency: String,
}

/// Mutable columns of a stored equity bar
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::stock_records)]
pub struct StockMeasurementsDB {
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
}

/// Database model for a stored exchange rate
#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::exchange_rate_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateRecordDB {
    pub id: i64,
    pub source_id: i64,
    pub date: String,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::exchange_rate_records)]
pub struct NewExchangeRateRecordDB {
    pub source_id: i64,
    pub date: String,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: String,
}

impl From<&StockRecord> for NewStockRecordDB {
    fn from(record: &StockRecord) -> Self {
        Self {
            source_id: record.source_id,
            date: format_date(record.date),
            open: record.open.to_string(),
            high: record.high.to_string(),
            low: record.low.to_string(),
            close: record.close.to_string(),
            volume: record.volume,
            stock_ticker: record.stock_ticker.clone(),
            base_currency: record.base_currency.clone(),
        }
    }
}

impl From<&StockRecord> for StockMeasurementsDB {
    fn from(record: &StockRecord) -> Self {
        Self {
            open: record.open.to_string(),
            high: record.high.to_string(),
            low: record.low.to_string(),
            close: record.close.to_string(),
            volume: record.volume,
        }
    }
}

impl From<&ExchangeRateRecord> for NewExchangeRateRecordDB {
    fn from(record: &ExchangeRateRecord) -> Self {
        Self {
            source_id: record.source_id,
            date: format_date(record.date),
            base_currency: record.base_currency.clone(),
            target_currency: record.target_currency.clone(),
            rate: record.rate.to_string(),
        }
    }
}

pub(crate) fn parse_day(value: &str) -> Result<NaiveDate, Error> {
    Ok(NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(ValidationError::DateTimeParse)?)
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, Error> {
    Ok(Decimal::from_str(value).map_err(ValidationError::DecimalParse)?)
}

impl TryFrom<StockRecordDB> for StockRecord {
    type Error = Error;

    fn try_from(db: StockRecordDB) -> Result<Self, Self::Error> {
        Ok(StockRecord {
            id: Some(db.id),
            source_id: db.source_id,
            date: parse_day(&db.date)?,
            open: parse_decimal(&db.open)?,
            high: parse_decimal(&db.high)?,
            low: parse_decimal(&db.low)?,
            close: parse_decimal(&db.close)?,
            volume: db.volume,
            stock_ticker: db.stock_ticker,
            base_currency: db.base_currency,
        })
    }
}

impl TryFrom<ExchangeRateRecordDB> for ExchangeRateRecord {
    type Error = Error;

    fn try_from(db: ExchangeRateRecordDB) -> Result<Self, Self::Error> {
        Ok(ExchangeRateRecord {
            id: Some(db.id),
            source_id: db.source_id,
            date: parse_day(&db.date)?,
            base_currency: db.base_currency,
            target_currency: db.target_currency,
            rate: parse_decimal(&db.rate)?,
        })
    }
}
