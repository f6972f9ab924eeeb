use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::records::StorageCategory;

/// A registered data source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub source_id: i64,
    /// Collector tag, e.g. `polygon`
    pub source_type: String,
    /// Collector-specific parameter: ticker for equities, base currency for rates
    pub url_additional: String,
    /// Earliest instant the first run collects from
    pub scrape_since: DateTime<Utc>,
    /// Opaque credential passed to the source
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Storage category tag; fixed at registration
    pub end_table: String,
}

impl SourceConfig {
    pub fn category(&self) -> Result<StorageCategory> {
        Ok(self.end_table.parse::<StorageCategory>()?)
    }
}

/// Input for registering a source. An empty `end_table` means "use the
/// default category for `source_type`".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSourceConfig {
    pub source_id: i64,
    pub source_type: String,
    pub url_additional: String,
    pub scrape_since: DateTime<Utc>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub end_table: String,
}

impl NewSourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source_type.trim().is_empty() {
            return Err(ValidationError::MissingField("source_type".to_string()).into());
        }
        if self.url_additional.trim().is_empty() {
            return Err(ValidationError::MissingField("url_additional".to_string()).into());
        }
        if !self.end_table.trim().is_empty() {
            self.end_table.parse::<StorageCategory>()?;
        }
        Ok(())
    }

    /// Explicit storage category, if one was given.
    pub fn explicit_end_table(&self) -> Option<&str> {
        let end_table = self.end_table.trim();
        (!end_table.is_empty()).then_some(end_table)
    }

    pub fn into_config(self, end_table: String) -> SourceConfig {
        SourceConfig {
            source_id: self.source_id,
            source_type: self.source_type.trim().to_string(),
            url_additional: self.url_additional.trim().to_string(),
            scrape_since: self.scrape_since,
            token: self.token.filter(|t| !t.is_empty()),
            end_table,
        }
    }
}
