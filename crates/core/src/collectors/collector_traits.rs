use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

use crate::errors::Result;
use crate::records::Record;
use crate::sources::SourceConfig;

/// Why a single raw row could not become a record. Rows failing this way are
/// skipped; the rest of the batch is unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

/// Records produced by one fetch, plus the number of rows dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedBatch {
    pub records: Vec<Record>,
    pub fetched: usize,
    pub skipped: usize,
}

/// A source-specific collector.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Raw row shape produced by `get_raw_data`
    type Row: Send + 'static;

    /// Fetches every row newer than `since` for this source.
    async fn get_raw_data(&self, config: &SourceConfig, since: DateTime<Utc>)
        -> Result<Vec<Self::Row>>;

    fn filter(&self, rows: Vec<Self::Row>) -> Vec<Self::Row> {
        rows
    }

    fn process_row(
        &self,
        config: &SourceConfig,
        row: Self::Row,
    ) -> std::result::Result<Record, RowError>;
}

/// Object-safe collection pipeline: fetch, filter, convert.
#[async_trait]
pub trait RecordCollector: Send + Sync {
    async fn collect_records(
        &self,
        config: &SourceConfig,
        since: DateTime<Utc>,
    ) -> Result<CollectedBatch>;
}

#[async_trait]
impl<C> RecordCollector for C
where
    C: Collector,
{
    async fn collect_records(
        &self,
        config: &SourceConfig,
        since: DateTime<Utc>,
    ) -> Result<CollectedBatch> {
        let raw = self.get_raw_data(config, since).await?;
        let fetched = raw.len();
        let rows = self.filter(raw);
        debug!(
            "Source {}: {} rows fetched, {} after filtering",
            config.source_id,
            fetched,
            rows.len()
        );

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for row in rows {
            match self.process_row(config, row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Source {}: failed to process row: {}", config.source_id, e);
                    skipped += 1;
                }
            }
        }

        Ok(CollectedBatch {
            records,
            fetched,
            skipped,
        })
    }
}
