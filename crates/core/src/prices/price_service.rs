use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::price_traits::PriceServiceTrait;
use crate::errors::{Result, ValidationError};
use crate::records::PriceStore;

pub struct PriceService {
    store: Arc<dyn PriceStore>,
}

impl PriceService {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }
}

impl PriceServiceTrait for PriceService {
    fn price_of(&self, ticker: &str, date: NaiveDate, currency: &str) -> Result<Option<Decimal>> {
        let ticker = ticker.trim().to_uppercase();
        let currency = currency.trim().to_uppercase();

        if let Some(close) = self.store.close_in_currency(&ticker, date, &currency)? {
            return Ok(Some(close));
        }

        match self.store.close_with_rate(&ticker, date, &currency)? {
            Some(converted) => {
                debug!(
                    "Converted {} close on {} from {} to {} at {}",
                    ticker, date, converted.close_currency, currency, converted.rate
                );
                let price = converted.converted().ok_or_else(|| {
                    ValidationError::InvalidInput(format!(
                        "{} close {} {} at rate {} overflows in {}",
                        ticker, converted.close, converted.close_currency, converted.rate, currency
                    ))
                })?;
                Ok(Some(price))
            }
            None => Ok(None),
        }
    }
}
