//! Tests for CollectionService orchestration.
//!
//! Storage and collectors are replaced by in-memory doubles; the record store
//! double applies the same natural-key upsert rules as the SQLite reconciler.

#[cfg(test)]
mod tests {
    use crate::collection::{CollectionService, CollectionServiceTrait};
    use crate::collectors::{Collector, RowError};
    use crate::errors::{CollectionError, Error, Result};
    use crate::records::{
        ensure_category, ExchangeRateRecord, Record, RecordStore, StockRecord, StorageCategory,
        WriteStats,
    };
    use crate::registry::CollectorRegistry;
    use crate::sources::{NewSourceConfig, SourceConfig, SourceRepositoryTrait};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Mock SourceRepository
    // =========================================================================

    #[derive(Default)]
    struct MockSourceRepository {
        sources: Mutex<Vec<SourceConfig>>,
        mappings: Mutex<HashMap<String, StorageCategory>>,
    }

    #[async_trait]
    impl SourceRepositoryTrait for MockSourceRepository {
        async fn seed_default_categories(
            &self,
            defaults: Vec<(String, StorageCategory)>,
        ) -> Result<usize> {
            let mut mappings = self.mappings.lock().unwrap();
            let mut inserted = 0;
            for (source_type, category) in defaults {
                if !mappings.contains_key(&source_type) {
                    mappings.insert(source_type, category);
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn create_source(&self, new_source: NewSourceConfig) -> Result<SourceConfig> {
            let mut sources = self.sources.lock().unwrap();
            if sources.iter().any(|s| s.source_id == new_source.source_id) {
                return Err(CollectionError::DuplicateSource(new_source.source_id).into());
            }
            let end_table = match new_source.explicit_end_table() {
                Some(end_table) => end_table.to_string(),
                None => self
                    .mappings
                    .lock()
                    .unwrap()
                    .get(&new_source.source_type)
                    .map(|c| c.to_string())
                    .ok_or_else(|| {
                        CollectionError::UnknownSourceType(new_source.source_type.clone())
                    })?,
            };
            let config = new_source.into_config(end_table);
            sources.push(config.clone());
            Ok(config)
        }

        fn get_source(&self, source_id: i64) -> Result<SourceConfig> {
            self.sources
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.source_id == source_id)
                .cloned()
                .ok_or_else(|| CollectionError::NotFound(source_id).into())
        }

        fn list_sources(&self) -> Result<Vec<SourceConfig>> {
            let mut sources = self.sources.lock().unwrap().clone();
            sources.sort_by_key(|s| s.source_id);
            Ok(sources)
        }

        fn default_category_for(&self, source_type: &str) -> Result<Option<StorageCategory>> {
            Ok(self.mappings.lock().unwrap().get(source_type).copied())
        }
    }

    // =========================================================================
    // Mock RecordStore
    // =========================================================================

    #[derive(Default)]
    struct MockRecordStore {
        records: Mutex<Vec<Record>>,
        next_id: Mutex<i64>,
    }

    impl MockRecordStore {
        fn same_key(a: &Record, b: &Record) -> bool {
            match (a, b) {
                (Record::Stock(a), Record::Stock(b)) => {
                    a.source_id == b.source_id
                        && a.date == b.date
                        && a.stock_ticker == b.stock_ticker
                }
                (Record::ExchangeRate(a), Record::ExchangeRate(b)) => {
                    a.source_id == b.source_id
                        && a.date == b.date
                        && a.base_currency == b.base_currency
                        && a.target_currency == b.target_currency
                }
                _ => false,
            }
        }

        fn all(&self) -> Vec<Record> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for MockRecordStore {
        async fn write_records(
            &self,
            records: Vec<Record>,
            category: StorageCategory,
        ) -> Result<WriteStats> {
            ensure_category(&records, category)?;
            let mut stored = self.records.lock().unwrap();
            let mut stats = WriteStats::default();
            for record in records {
                if record.validate().is_err() {
                    stats.failed += 1;
                    continue;
                }
                match stored.iter_mut().find(|r| Self::same_key(r, &record)) {
                    Some(existing) => {
                        let id = match existing {
                            Record::Stock(r) => r.id,
                            Record::ExchangeRate(r) => r.id,
                        };
                        *existing = record;
                        match existing {
                            Record::Stock(r) => r.id = id,
                            Record::ExchangeRate(r) => r.id = id,
                        }
                        stats.modified += 1;
                    }
                    None => {
                        let mut next_id = self.next_id.lock().unwrap();
                        *next_id += 1;
                        let mut record = record;
                        match &mut record {
                            Record::Stock(r) => r.id = Some(*next_id),
                            Record::ExchangeRate(r) => r.id = Some(*next_id),
                        }
                        stored.push(record);
                        stats.inserted += 1;
                    }
                }
            }
            Ok(stats)
        }

        fn latest_record_date(
            &self,
            source_id: i64,
            category: StorageCategory,
        ) -> Result<Option<NaiveDate>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.category() == category && r.source_id() == source_id)
                .map(|r| r.date())
                .max())
        }
    }

    // =========================================================================
    // Mock Collector
    // =========================================================================

    /// Replays the same rows on every run and records the requested start.
    struct StaticCollector {
        rows: Vec<std::result::Result<Record, RowError>>,
        seen_since: Mutex<Vec<DateTime<Utc>>>,
        fail: bool,
    }

    impl StaticCollector {
        fn new(rows: Vec<std::result::Result<Record, RowError>>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                seen_since: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                rows: Vec::new(),
                seen_since: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Collector for StaticCollector {
        type Row = std::result::Result<Record, RowError>;

        async fn get_raw_data(
            &self,
            _config: &SourceConfig,
            since: DateTime<Utc>,
        ) -> Result<Vec<Self::Row>> {
            self.seen_since.lock().unwrap().push(since);
            if self.fail {
                return Err(fincollect_market_data::MarketDataError::Http {
                    status: 503,
                    url: "http://source.test".to_string(),
                }
                .into());
            }
            Ok(self.rows.clone())
        }

        fn process_row(
            &self,
            _config: &SourceConfig,
            row: Self::Row,
        ) -> std::result::Result<Record, RowError> {
            row
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn stock(source_id: i64, d: u32, ticker: &str, close: Decimal) -> Record {
        Record::Stock(StockRecord {
            id: None,
            source_id,
            date: day(d),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
            stock_ticker: ticker.to_string(),
            base_currency: "USD".to_string(),
        })
    }

    fn rate(source_id: i64, d: u32, target: &str, value: Decimal) -> Record {
        Record::ExchangeRate(ExchangeRateRecord {
            id: None,
            source_id,
            date: day(d),
            base_currency: "USD".to_string(),
            target_currency: target.to_string(),
            rate: value,
        })
    }

    fn new_source(source_id: i64, source_type: &str, end_table: &str) -> NewSourceConfig {
        NewSourceConfig {
            source_id,
            source_type: source_type.to_string(),
            url_additional: "NVDA".to_string(),
            scrape_since: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            token: None,
            end_table: end_table.to_string(),
        }
    }

    struct Fixture {
        service: CollectionService,
        store: Arc<MockRecordStore>,
    }

    async fn fixture(collectors: Vec<(&str, Arc<StaticCollector>)>) -> Fixture {
        let mut registry = CollectorRegistry::new();
        for (tag, collector) in collectors {
            registry.register(tag, collector);
        }
        let store = Arc::new(MockRecordStore::default());
        let service = CollectionService::new(
            Arc::new(registry),
            Arc::new(MockSourceRepository::default()),
            store.clone(),
        );
        service.initialize().await.unwrap();
        Fixture { service, store }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    #[tokio::test]
    async fn test_register_source_resolves_default_category() {
        let f = fixture(vec![]).await;

        let polygon = f
            .service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();
        let fx = f
            .service
            .register_source(new_source(2, "frankfurter", ""))
            .await
            .unwrap();

        assert_eq!(polygon.end_table, "stock_records");
        assert_eq!(fx.end_table, "exchange_rate_records");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let f = fixture(vec![]).await;
        f.service.initialize().await.unwrap();

        let source = f
            .service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();
        assert_eq!(source.end_table, "stock_records");
    }

    #[tokio::test]
    async fn test_register_source_explicit_category_is_kept() {
        let f = fixture(vec![]).await;

        let source = f
            .service
            .register_source(new_source(1, "custom", "exchange_rate_records"))
            .await
            .unwrap();
        assert_eq!(source.end_table, "exchange_rate_records");
    }

    #[tokio::test]
    async fn test_register_source_errors() {
        let f = fixture(vec![]).await;
        f.service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();

        let duplicate = f
            .service
            .register_source(new_source(1, "frankfurter", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            duplicate,
            Error::Collection(CollectionError::DuplicateSource(1))
        ));

        let unknown_type = f
            .service
            .register_source(new_source(2, "yahoo", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            unknown_type,
            Error::Collection(CollectionError::UnknownSourceType(_))
        ));

        let unknown_category = f
            .service
            .register_source(new_source(3, "polygon", "bond_records"))
            .await
            .unwrap_err();
        assert!(matches!(
            unknown_category,
            Error::Collection(CollectionError::UnknownCategory(_))
        ));
    }

    // =========================================================================
    // Collection
    // =========================================================================

    #[tokio::test]
    async fn test_collect_is_idempotent() {
        let collector = StaticCollector::new(vec![
            Ok(stock(1, 3, "NVDA", dec!(120))),
            Ok(stock(1, 4, "NVDA", dec!(121))),
        ]);
        let f = fixture(vec![("polygon", collector.clone())]).await;
        f.service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();

        let first = f.service.collect_source(1).await.unwrap();
        let after_first = f.store.all();
        let second = f.service.collect_source(1).await.unwrap();

        assert_eq!((first.inserted, first.modified, first.failed), (2, 0, 0));
        assert_eq!((second.inserted, second.modified, second.failed), (0, 2, 0));
        assert_eq!(f.store.all(), after_first);
    }

    #[tokio::test]
    async fn test_collect_advances_watermark() {
        let collector = StaticCollector::new(vec![Ok(stock(1, 4, "NVDA", dec!(121)))]);
        let f = fixture(vec![("polygon", collector.clone())]).await;
        f.service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();

        f.service.collect_source(1).await.unwrap();
        f.service.collect_source(1).await.unwrap();

        let seen = collector.seen_since.lock().unwrap().clone();
        assert_eq!(seen[0], Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(seen[1], Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_collect_reports_skipped_rows() {
        let collector = StaticCollector::new(vec![
            Ok(rate(2, 3, "EUR", dec!(0.95))),
            Err(RowError::InvalidDate("03/03/2025".to_string())),
            Ok(rate(2, 3, "ILS", dec!(3.6))),
        ]);
        let f = fixture(vec![("frankfurter", collector)]).await;
        f.service
            .register_source(new_source(2, "frankfurter", ""))
            .await
            .unwrap();

        let stats = f.service.collect_source(2).await.unwrap();

        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(f.store.all().len(), 2);
    }

    #[tokio::test]
    async fn test_collect_category_mismatch_writes_nothing() {
        // Source stores into exchange_rate_records but the collector emits equities
        let collector = StaticCollector::new(vec![Ok(stock(1, 3, "NVDA", dec!(120)))]);
        let f = fixture(vec![("polygon", collector)]).await;
        f.service
            .register_source(new_source(1, "polygon", "exchange_rate_records"))
            .await
            .unwrap();

        let err = f.service.collect_source(1).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Collection(CollectionError::CategoryMismatch { .. })
        ));
        assert!(f.store.all().is_empty());
    }

    #[tokio::test]
    async fn test_collect_without_collector() {
        let f = fixture(vec![]).await;
        f.service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();

        let err = f.service.collect_source(1).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Collection(CollectionError::NoCollector(_))
        ));
    }

    #[tokio::test]
    async fn test_collect_unknown_source() {
        let f = fixture(vec![]).await;

        let err = f.service.collect_source(42).await.unwrap_err();
        assert!(matches!(err, Error::Collection(CollectionError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_collect_all_continues_after_failure() {
        let good = StaticCollector::new(vec![Ok(rate(2, 3, "ILS", dec!(3.6)))]);
        let f = fixture(vec![
            ("polygon", StaticCollector::failing()),
            ("frankfurter", good),
        ])
        .await;
        f.service
            .register_source(new_source(1, "polygon", ""))
            .await
            .unwrap();
        f.service
            .register_source(new_source(2, "frankfurter", ""))
            .await
            .unwrap();

        let results = f.service.collect_all().await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source_id, 1);
        assert!(matches!(results[0].result, Err(Error::MarketData(_))));
        assert_eq!(results[1].source_id, 2);
        assert_eq!(results[1].result.as_ref().unwrap().inserted, 1);
    }
}
