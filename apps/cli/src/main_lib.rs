use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use fincollect_core::collection::{CollectionService, CollectionServiceTrait};
use fincollect_core::prices::PriceService;
use fincollect_core::registry::CollectorRegistry;
use fincollect_core::utils::time_utils::{day_start_utc, parse_iso_date};
use fincollect_market_data::{
    FetchClient, FrankfurterProvider, PolygonProvider, RateLimitPolicy, ReqwestTransport,
};
use fincollect_storage_sqlite::{db, RecordRepository, SourceRepository};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub collection_service: Arc<CollectionService>,
    pub price_service: Arc<PriceService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

pub fn build_fetch_client(config: &Config) -> anyhow::Result<FetchClient> {
    let transport = ReqwestTransport::new(config.http_timeout)?;
    let policy = RateLimitPolicy {
        max_attempts: config.rate_limit_attempts,
        ..RateLimitPolicy::default()
    };
    Ok(FetchClient::new(Arc::new(transport)).with_policy(policy))
}

pub fn build_registry(config: &Config, client: FetchClient) -> CollectorRegistry {
    let mut polygon = PolygonProvider::new(client.clone());
    if let Some(url) = &config.polygon_base_url {
        polygon = polygon.with_base_url(url);
    }
    let mut frankfurter = FrankfurterProvider::new(client);
    if let Some(url) = &config.frankfurter_base_url {
        frankfurter = frankfurter.with_base_url(url);
    }
    CollectorRegistry::with_defaults(polygon, frankfurter)
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let source_repository = Arc::new(SourceRepository::new(pool.clone(), writer.clone()));
    let record_repository = Arc::new(RecordRepository::new(pool, writer));

    let registry = Arc::new(build_registry(config, build_fetch_client(config)?));
    let collection_service = Arc::new(CollectionService::new(
        registry,
        source_repository,
        record_repository.clone(),
    ));
    collection_service.initialize().await?;

    let price_service = Arc::new(PriceService::new(record_repository));

    Ok(AppState {
        collection_service,
        price_service,
    })
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_since(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(ts.with_timezone(&Utc));
    }
    parse_iso_date(value)
        .map(day_start_utc)
        .ok_or_else(|| anyhow::anyhow!("'{}' is not a date or RFC 3339 timestamp", value))
}

/// Output of the `price` command. A miss is reported, not treated as a failure.
pub fn price_line(ticker: &str, date: NaiveDate, currency: &str, price: Option<Decimal>) -> String {
    match price {
        Some(price) => price.to_string(),
        None => format!("not found: {} on {} in {}", ticker, date, currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn config() -> Config {
        Config {
            db_path: "unused.db".to_string(),
            polygon_base_url: Some("http://localhost:9000/".to_string()),
            frankfurter_base_url: None,
            http_timeout: Duration::from_secs(5),
            rate_limit_attempts: 5,
        }
    }

    #[test]
    fn test_parse_since() {
        assert_eq!(
            parse_since("2025-02-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_since("2025-02-01T10:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap()
        );
        assert!(parse_since("yesterday").is_err());
    }

    #[test]
    fn test_price_line() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        assert_eq!(
            price_line("NVDA", day, "PLN", Some(Decimal::from(540))),
            "540"
        );
        assert_eq!(
            price_line("NVDA", day, "JPY", None),
            "not found: NVDA on 2025-02-03 in JPY"
        );
    }

    #[test]
    fn test_fetch_client_uses_configured_attempts() {
        let client = build_fetch_client(&config()).unwrap();
        assert_eq!(client.policy().max_attempts, 5);
        assert_eq!(client.policy().default_retry_after, Duration::from_secs(60));
    }

    #[test]
    fn test_registry_has_builtin_collectors() {
        let client = build_fetch_client(&config()).unwrap();
        let registry = build_registry(&config(), client);
        assert!(registry.contains("polygon"));
        assert!(registry.contains("frankfurter"));
    }

    #[tokio::test]
    async fn test_build_state_initializes_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.db_path = dir
            .path()
            .join("nested")
            .join("fincollect.db")
            .to_string_lossy()
            .to_string();

        let state = build_state(&config).await.unwrap();

        assert!(std::path::Path::new(&config.db_path).exists());
        assert!(state.collection_service.list_sources().unwrap().is_empty());
    }
}
