use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;

/// Trait defining the contract for price lookups.
pub trait PriceServiceTrait: Send + Sync {
    /// Close of `ticker` on `date` expressed in `currency`.
    ///
    /// Returns `Ok(None)` when no stored close exists in `currency` and no
    /// same-day rate converts a stored close into it.
    fn price_of(&self, ticker: &str, date: NaiveDate, currency: &str) -> Result<Option<Decimal>>;
}
