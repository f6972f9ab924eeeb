//! Records module - the uniform record model written by every collector.

mod records_model;
mod records_traits;


pub use records_model::{
    ensure_category, CollectStats, ExchangeRateRecord, Record, StockRecord, StorageCategory,
    WriteStats,
};
pub use records_traits::{ConvertedClose, PriceStore, RecordStore};
