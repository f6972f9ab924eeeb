//! Prices module - close price of a ticker on a date in a requested currency.

mod price_service;
mod price_traits;

pub use price_service::PriceService;
pub use price_traits::PriceServiceTrait;
