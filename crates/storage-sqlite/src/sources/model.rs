//! Database models for sources.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use fincollect_core::errors::{Error, ValidationError};
use fincollect_core::sources::SourceConfig;

/// Database model for a registered source
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::sources)]
#[diesel(primary_key(source_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SourceConfigDB {
    pub source_id: i64,
    pub source_type: String,
    pub url_additional: String,
    /// RFC 3339, UTC
    pub scrape_since: String,
    pub token: Option<String>,
    pub end_table: String,
}

impl From<&SourceConfig> for SourceConfigDB {
    fn from(config: &SourceConfig) -> Self {
        Self {
            source_id: config.source_id,
            source_type: config.source_type.clone(),
            url_additional: config.url_additional.clone(),
            scrape_since: config
                .scrape_since
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            token: config.token.clone(),
            end_table: config.end_table.clone(),
        }
    }
}

impl TryFrom<SourceConfigDB> for SourceConfig {
    type Error = Error;

    fn try_from(db: SourceConfigDB) -> Result<Self, Self::Error> {
        let scrape_since = DateTime::parse_from_rfc3339(&db.scrape_since)
            .map_err(ValidationError::DateTimeParse)?
            .with_timezone(&Utc);

        Ok(SourceConfig {
            source_id: db.source_id,
            source_type: db.source_type,
            url_additional: db.url_additional,
            scrape_since,
            token: db.token,
            end_table: db.end_table,
        })
    }
}

/// Row of the `source_type -> end_table` mapping
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::source_type_end_table)]
pub struct NewSourceTypeCategoryDB {
    pub source_type: String,
    pub end_table: String,
}
