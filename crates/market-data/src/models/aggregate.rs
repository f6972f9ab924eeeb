use serde::{Deserialize, Serialize};

/// One daily aggregate bar as returned by the Polygon aggregates endpoint.
///
/// Every field is optional: the API omits fields for partial bars and the
/// collector decides which rows are usable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateBar {
    /// Bar start, milliseconds since the Unix epoch (UTC)
    #[serde(rename = "t")]
    pub timestamp_ms: Option<i64>,

    #[serde(rename = "o")]
    pub open: Option<f64>,

    #[serde(rename = "h")]
    pub high: Option<f64>,

    #[serde(rename = "l")]
    pub low: Option<f64>,

    #[serde(rename = "c")]
    pub close: Option<f64>,

    /// Traded volume; the API reports it as a float
    #[serde(rename = "v")]
    pub volume: Option<f64>,
}
