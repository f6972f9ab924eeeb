//! Collectors module - turn provider payloads into records.
//!
//! A collector implements [`Collector`]: fetch raw rows, optionally filter
//! them, and convert each row into a [`Record`](crate::records::Record). Every
//! `Collector` is also a [`RecordCollector`], the object-safe form the
//! registry stores and the collection service drives.

mod collector_traits;
mod equity_collector;
mod exchange_rate_collector;

#[cfg(test)]
pub(crate) mod test_support;

pub use collector_traits::{CollectedBatch, Collector, RecordCollector, RowError};
pub use equity_collector::{EquityCollector, StockRow};
pub use exchange_rate_collector::{ExchangeRateCollector, RateRow};
