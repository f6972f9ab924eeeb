//! Storage for collected records.

mod model;
mod repository;

pub use model::{
    ExchangeRateRecordDB, NewExchangeRateRecordDB, NewStockRecordDB, StockMeasurementsDB,
    StockRecordDB,
};
pub use repository::RecordRepository;
