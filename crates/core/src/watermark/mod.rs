//! Watermark resolution - where an incremental run starts.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;

use crate::errors::Result;
use crate::records::{RecordStore, StorageCategory};
use crate::utils::time_utils::day_start_utc;

/// Later of the configured start and midnight UTC of the latest stored date.
///
/// The latest stored day itself is re-fetched so a partial bar written
/// mid-day is refreshed on the next run.
pub fn effective_since(
    configured_since: DateTime<Utc>,
    latest_stored: Option<NaiveDate>,
) -> DateTime<Utc> {
    match latest_stored {
        Some(date) => configured_since.max(day_start_utc(date)),
        None => configured_since,
    }
}

pub struct WatermarkResolver {
    store: Arc<dyn RecordStore>,
}

impl WatermarkResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolves the start of the next fetch for `source_id`. Storage errors
    /// propagate; they never fall back to the configured start.
    pub fn resolve(
        &self,
        source_id: i64,
        category: StorageCategory,
        configured_since: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let latest = self.store.latest_record_date(source_id, category)?;
        let since = effective_since(configured_since, latest);
        debug!(
            "Watermark for source {} in {}: latest stored {:?}, fetching since {}",
            source_id, category, latest, since
        );
        Ok(since)
    }
}
