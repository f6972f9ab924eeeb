/// Source type tag served by the Polygon equity collector
pub const SOURCE_TYPE_POLYGON: &str = "polygon";

/// Source type tag served by the Frankfurter exchange-rate collector
pub const SOURCE_TYPE_FRANKFURTER: &str = "frankfurter";

/// Currency assigned to every equity bar. Polygon aggregates carry no
/// currency field, so non-USD listings are stored mislabeled.
pub const EQUITY_BASE_CURRENCY: &str = "USD";

/// Format used for calendar dates in URLs and storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";
