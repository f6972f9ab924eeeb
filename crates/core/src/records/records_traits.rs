use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::records_model::{Record, StorageCategory, WriteStats};
use crate::errors::Result;

/// Persistence contract for collected records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts or updates each record by natural key.
    ///
    /// The whole call fails with `CategoryMismatch` before writing anything if
    /// a record does not belong to `category`. Any other per-record failure is
    /// counted in `WriteStats::failed` and does not affect the other records.
    async fn write_records(
        &self,
        records: Vec<Record>,
        category: StorageCategory,
    ) -> Result<WriteStats>;

    /// Latest stored date for `source_id` in `category`, if any.
    fn latest_record_date(
        &self,
        source_id: i64,
        category: StorageCategory,
    ) -> Result<Option<NaiveDate>>;
}

/// A close price together with the rate that converts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedClose {
    pub close: Decimal,
    pub close_currency: String,
    pub rate: Decimal,
}

impl ConvertedClose {
    /// `close * rate`, or `None` when the product does not fit a `Decimal`.
    pub fn converted(&self) -> Option<Decimal> {
        self.close.checked_mul(self.rate)
    }
}

/// Read queries backing the price lookup.
pub trait PriceStore: Send + Sync {
    /// Close of `ticker` on `date` stored with `base_currency == currency`.
    fn close_in_currency(
        &self,
        ticker: &str,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<Decimal>>;

    /// Close of `ticker` on `date` paired with a same-day rate from the
    /// equity's currency into `currency`.
    fn close_with_rate(
        &self,
        ticker: &str,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<ConvertedClose>>;
}
