//! Market data models
//!
//! Raw rows as providers hand them over:
//! - `aggregate` - Daily equity bars (AggregateBar)
//! - `rates` - Daily exchange-rate snapshots (DailyRates)

mod aggregate;
mod rates;

pub use aggregate::AggregateBar;
pub use rates::DailyRates;
