use chrono::{TimeZone, Utc};

pub use fincollect_market_data::testing::ScriptedTransport;

use crate::sources::SourceConfig;

pub fn config(source_id: i64, source_type: &str, url_additional: &str, end_table: &str) -> SourceConfig {
    SourceConfig {
        source_id,
        source_type: source_type.to_string(),
        url_additional: url_additional.to_string(),
        scrape_since: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        token: Some("secret".to_string()),
        end_table: end_table.to_string(),
    }
}
