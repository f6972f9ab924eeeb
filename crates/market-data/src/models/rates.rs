use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All rates published for one day against a single base currency.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRates {
    /// Date exactly as the provider wrote it (ISO-8601)
    pub date: String,

    /// Target currency code -> units of target per one unit of base.
    /// `None` when the provider sent a null or non-numeric value.
    pub rates: BTreeMap<String, Option<f64>>,
}
