use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use fincollect_core::errors::Result;
use fincollect_core::records::{
    ensure_category, ConvertedClose, ExchangeRateRecord, PriceStore, Record, RecordStore,
    StockRecord, StorageCategory, WriteStats,
};
use fincollect_core::utils::time_utils::format_date;

use super::model::{
    parse_day, parse_decimal, ExchangeRateRecordDB, NewExchangeRateRecordDB, NewStockRecordDB,
    StockMeasurementsDB, StockRecordDB,
};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{exchange_rate_records, stock_records};

/// Result of reconciling one record against storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Inserted,
    Modified,
}

pub struct RecordRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RecordRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// All stored bars of a source, oldest first.
    pub fn load_stock_records(&self, source_id: i64) -> Result<Vec<StockRecord>> {
        let mut conn = get_connection(&self.pool)?;
        stock_records::table
            .filter(stock_records::source_id.eq(source_id))
            .order((stock_records::date.asc(), stock_records::stock_ticker.asc()))
            .select(StockRecordDB::as_select())
            .load::<StockRecordDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(StockRecord::try_from)
            .collect()
    }

    /// All stored rates of a source, oldest first.
    pub fn load_exchange_rate_records(&self, source_id: i64) -> Result<Vec<ExchangeRateRecord>> {
        let mut conn = get_connection(&self.pool)?;
        exchange_rate_records::table
            .filter(exchange_rate_records::source_id.eq(source_id))
            .order((
                exchange_rate_records::date.asc(),
                exchange_rate_records::target_currency.asc(),
            ))
            .select(ExchangeRateRecordDB::as_select())
            .load::<ExchangeRateRecordDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(ExchangeRateRecord::try_from)
            .collect()
    }
}

fn upsert_stock(
    conn: &mut SqliteConnection,
    record: &StockRecord,
) -> std::result::Result<Reconciled, StorageError> {
    let day = format_date(record.date);
    let existing = stock_records::table
        .filter(stock_records::source_id.eq(record.source_id))
        .filter(stock_records::date.eq(&day))
        .filter(stock_records::stock_ticker.eq(&record.stock_ticker))
        .select(stock_records::id)
        .first::<i64>(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(stock_records::table.find(id))
                .set(&StockMeasurementsDB::from(record))
                .execute(conn)?;
            Ok(Reconciled::Modified)
        }
        None => {
            diesel::insert_into(stock_records::table)
                .values(&NewStockRecordDB::from(record))
                .execute(conn)?;
            Ok(Reconciled::Inserted)
        }
    }
}

fn upsert_exchange_rate(
    conn: &mut SqliteConnection,
    record: &ExchangeRateRecord,
) -> std::result::Result<Reconciled, StorageError> {
    let day = format_date(record.date);
    let existing = exchange_rate_records::table
        .filter(exchange_rate_records::source_id.eq(record.source_id))
        .filter(exchange_rate_records::date.eq(&day))
        .filter(exchange_rate_records::base_currency.eq(&record.base_currency))
        .filter(exchange_rate_records::target_currency.eq(&record.target_currency))
        .select(exchange_rate_records::id)
        .first::<i64>(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(exchange_rate_records::table.find(id))
                .set(exchange_rate_records::rate.eq(record.rate.to_string()))
                .execute(conn)?;
            Ok(Reconciled::Modified)
        }
        None => {
            diesel::insert_into(exchange_rate_records::table)
                .values(&NewExchangeRateRecordDB::from(record))
                .execute(conn)?;
            Ok(Reconciled::Inserted)
        }
    }
}

fn upsert_record(
    conn: &mut SqliteConnection,
    record: &Record,
) -> std::result::Result<Reconciled, StorageError> {
    record.validate()?;
    match record {
        Record::Stock(r) => upsert_stock(conn, r),
        Record::ExchangeRate(r) => upsert_exchange_rate(conn, r),
    }
}

#[async_trait]
impl RecordStore for RecordRepository {
    async fn write_records(
        &self,
        records: Vec<Record>,
        category: StorageCategory,
    ) -> Result<WriteStats> {
        ensure_category(&records, category)?;
        if records.is_empty() {
            return Ok(WriteStats::default());
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<WriteStats> {
                let mut stats = WriteStats::default();
                for record in &records {
                    // Savepoint per record: a failure only undoes this record.
                    match conn.transaction::<_, StorageError, _>(|tx| upsert_record(tx, record)) {
                        Ok(Reconciled::Inserted) => stats.inserted += 1,
                        Ok(Reconciled::Modified) => stats.modified += 1,
                        Err(e) => {
                            warn!(
                                "Failed to write {} record {} to {}: {}",
                                record.kind(),
                                record.natural_key(),
                                category,
                                e
                            );
                            stats.failed += 1;
                        }
                    }
                }
                debug!("Reconciled {} records into {}: {}", records.len(), category, stats);
                Ok(stats)
            })
            .await
    }

    fn latest_record_date(
        &self,
        source_id: i64,
        category: StorageCategory,
    ) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let latest = match category {
            StorageCategory::StockRecords => stock_records::table
                .filter(stock_records::source_id.eq(source_id))
                .select(max(stock_records::date))
                .first::<Option<String>>(&mut conn)
                .into_core()?,
            StorageCategory::ExchangeRateRecords => exchange_rate_records::table
                .filter(exchange_rate_records::source_id.eq(source_id))
                .select(max(exchange_rate_records::date))
                .first::<Option<String>>(&mut conn)
                .into_core()?,
        };
        latest.as_deref().map(parse_day).transpose()
    }
}

impl PriceStore for RecordRepository {
    fn close_in_currency(
        &self,
        ticker: &str,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<Decimal>> {
        let mut conn = get_connection(&self.pool)?;
        let close = stock_records::table
            .filter(stock_records::stock_ticker.eq(ticker))
            .filter(stock_records::date.eq(format_date(date)))
            .filter(stock_records::base_currency.eq(currency))
            .order(stock_records::source_id.asc())
            .select(stock_records::close)
            .first::<String>(&mut conn)
            .optional()
            .into_core()?;
        close.as_deref().map(parse_decimal).transpose()
    }

    fn close_with_rate(
        &self,
        ticker: &str,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<ConvertedClose>> {
        let mut conn = get_connection(&self.pool)?;
        let row = stock_records::table
            .inner_join(
                exchange_rate_records::table.on(exchange_rate_records::base_currency
                    .eq(stock_records::base_currency)
                    .and(exchange_rate_records::date.eq(stock_records::date))),
            )
            .filter(stock_records::stock_ticker.eq(ticker))
            .filter(stock_records::date.eq(format_date(date)))
            .filter(exchange_rate_records::target_currency.eq(currency))
            .order((
                stock_records::source_id.asc(),
                exchange_rate_records::source_id.asc(),
            ))
            .select((
                stock_records::close,
                stock_records::base_currency,
                exchange_rate_records::rate,
            ))
            .first::<(String, String, String)>(&mut conn)
            .optional()
            .into_core()?;

        row.map(|(close, close_currency, rate)| -> Result<ConvertedClose> {
            Ok(ConvertedClose {
                close: parse_decimal(&close)?,
                close_currency,
                rate: parse_decimal(&rate)?,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use crate::sources::SourceRepository;
    use chrono::{TimeZone, Utc};
    use fincollect_core::errors::{CollectionError, Error};
    use fincollect_core::registry::default_categories;
    use fincollect_core::sources::{NewSourceConfig, SourceRepositoryTrait};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Repository over a fresh database with source 1 (polygon) and
    /// source 2 (frankfurter) registered.
    async fn create_test_repository() -> (RecordRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let sources = SourceRepository::new(Arc::clone(&pool), writer.clone());
        sources
            .seed_default_categories(default_categories())
            .await
            .unwrap();
        for (source_id, source_type, url_additional) in
            [(1, "polygon", "NVDA"), (2, "frankfurter", "USD")]
        {
            sources
                .create_source(NewSourceConfig {
                    source_id,
                    source_type: source_type.to_string(),
                    url_additional: url_additional.to_string(),
                    scrape_since: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
                    token: None,
                    end_table: String::new(),
                })
                .await
                .unwrap();
        }

        (RecordRepository::new(pool, writer), temp_dir)
    }

    fn bar(source_id: i64, ticker: &str, day: NaiveDate, close: Decimal) -> Record {
        Record::Stock(StockRecord {
            id: None,
            source_id,
            date: day,
            open: dec!(100),
            high: dec!(200),
            low: dec!(90),
            close,
            volume: 1_000,
            stock_ticker: ticker.to_string(),
            base_currency: "USD".to_string(),
        })
    }

    fn rate(source_id: i64, day: NaiveDate, target: &str, value: Decimal) -> Record {
        Record::ExchangeRate(ExchangeRateRecord {
            id: None,
            source_id,
            date: day,
            base_currency: "USD".to_string(),
            target_currency: target.to_string(),
            rate: value,
        })
    }

    #[tokio::test]
    async fn test_insert_then_update_keeps_id() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);

        let first = repo
            .write_records(vec![bar(1, "NVDA", day, dec!(150))], StorageCategory::StockRecords)
            .await
            .unwrap();
        assert_eq!(first, WriteStats { inserted: 1, modified: 0, failed: 0 });
        let original_id = repo.load_stock_records(1).unwrap()[0].id;

        let second = repo
            .write_records(vec![bar(1, "NVDA", day, dec!(155.5))], StorageCategory::StockRecords)
            .await
            .unwrap();
        assert_eq!(second, WriteStats { inserted: 0, modified: 1, failed: 0 });

        let stored = repo.load_stock_records(1).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, original_id);
        assert_eq!(stored[0].close, dec!(155.5));
    }

    #[tokio::test]
    async fn test_tickers_do_not_share_natural_key() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);

        let stats = repo
            .write_records(
                vec![bar(1, "NVDA", day, dec!(150)), bar(1, "AAPL", day, dec!(230))],
                StorageCategory::StockRecords,
            )
            .await
            .unwrap();

        assert_eq!(stats.inserted, 2);
        let tickers: Vec<String> = repo
            .load_stock_records(1)
            .unwrap()
            .into_iter()
            .map(|r| r.stock_ticker)
            .collect();
        assert_eq!(tickers, vec!["AAPL".to_string(), "NVDA".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_record_does_not_block_others() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);

        // Source 42 is not registered, so its insert violates the foreign key.
        let stats = repo
            .write_records(
                vec![
                    bar(1, "NVDA", day, dec!(150)),
                    bar(42, "NVDA", day, dec!(150)),
                    bar(1, "NVDA", date(2025, 2, 4), dec!(151)),
                ],
                StorageCategory::StockRecords,
            )
            .await
            .unwrap();

        assert_eq!(stats, WriteStats { inserted: 2, modified: 0, failed: 1 });
        assert_eq!(repo.load_stock_records(1).unwrap().len(), 2);
        assert!(repo.load_stock_records(42).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_record_counts_as_failed() {
        let (repo, _dir) = create_test_repository().await;

        let stats = repo
            .write_records(
                vec![rate(2, date(2025, 2, 3), "EUR", dec!(-1))],
                StorageCategory::ExchangeRateRecords,
            )
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert!(repo.load_exchange_rate_records(2).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_mismatch_writes_nothing() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);

        let err = repo
            .write_records(
                vec![rate(2, day, "EUR", dec!(0.96)), bar(1, "NVDA", day, dec!(150))],
                StorageCategory::ExchangeRateRecords,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Collection(CollectionError::CategoryMismatch { .. })
        ));
        assert!(repo.load_exchange_rate_records(2).unwrap().is_empty());
        assert!(repo.load_stock_records(1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_rate_upsert() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);

        repo.write_records(
            vec![rate(2, day, "EUR", dec!(0.96)), rate(2, day, "PLN", dec!(4.05))],
            StorageCategory::ExchangeRateRecords,
        )
        .await
        .unwrap();
        let stats = repo
            .write_records(
                vec![rate(2, day, "EUR", dec!(0.97))],
                StorageCategory::ExchangeRateRecords,
            )
            .await
            .unwrap();

        assert_eq!(stats, WriteStats { inserted: 0, modified: 1, failed: 0 });
        let stored = repo.load_exchange_rate_records(2).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].target_currency, "EUR");
        assert_eq!(stored[0].rate, dec!(0.97));
    }

    #[tokio::test]
    async fn test_latest_record_date_per_category() {
        let (repo, _dir) = create_test_repository().await;
        assert_eq!(
            repo.latest_record_date(1, StorageCategory::StockRecords).unwrap(),
            None
        );

        repo.write_records(
            vec![
                bar(1, "NVDA", date(2025, 2, 3), dec!(150)),
                bar(1, "NVDA", date(2025, 2, 10), dec!(152)),
                bar(1, "NVDA", date(2025, 2, 5), dec!(151)),
            ],
            StorageCategory::StockRecords,
        )
        .await
        .unwrap();

        assert_eq!(
            repo.latest_record_date(1, StorageCategory::StockRecords).unwrap(),
            Some(date(2025, 2, 10))
        );
        assert_eq!(
            repo.latest_record_date(1, StorageCategory::ExchangeRateRecords)
                .unwrap(),
            None
        );
        assert_eq!(
            repo.latest_record_date(2, StorageCategory::StockRecords).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_price_queries() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2025, 2, 3);
        repo.write_records(vec![bar(1, "NVDA", day, dec!(150))], StorageCategory::StockRecords)
            .await
            .unwrap();
        repo.write_records(
            vec![rate(2, day, "PLN", dec!(3.6))],
            StorageCategory::ExchangeRateRecords,
        )
        .await
        .unwrap();

        assert_eq!(
            repo.close_in_currency("NVDA", day, "USD").unwrap(),
            Some(dec!(150))
        );
        assert_eq!(repo.close_in_currency("NVDA", day, "PLN").unwrap(), None);

        let converted = repo.close_with_rate("NVDA", day, "PLN").unwrap().unwrap();
        assert_eq!(converted.close_currency, "USD");
        assert_eq!(converted.converted(), Some(dec!(540)));

        assert_eq!(repo.close_with_rate("NVDA", day, "EUR").unwrap(), None);
        assert_eq!(
            repo.close_with_rate("NVDA", date(2025, 2, 4), "PLN").unwrap(),
            None
        );
    }
}
