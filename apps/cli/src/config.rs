use std::time::Duration;

use anyhow::{Context, Result};
use fincollect_market_data::DEFAULT_REQUEST_TIMEOUT;

const DEFAULT_DB_PATH: &str = "./db/fincollect.db";
const DEFAULT_RATE_LIMIT_ATTEMPTS: u32 = 3;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: String,
    pub polygon_base_url: Option<String>,
    pub frankfurter_base_url: Option<String>,
    pub http_timeout: Duration,
    /// Requests allowed per URL when every answer is a 429.
    pub rate_limit_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = non_empty("FC_DB_PATH")
            .or_else(|| non_empty("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let http_timeout = match non_empty("FC_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("FC_HTTP_TIMEOUT_SECS must be whole seconds, got '{}'", raw))?,
            ),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let rate_limit_attempts = match non_empty("FC_RATE_LIMIT_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("FC_RATE_LIMIT_RETRIES must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_RATE_LIMIT_ATTEMPTS,
        };

        Ok(Self {
            db_path,
            polygon_base_url: non_empty("FC_POLYGON_BASE_URL"),
            frankfurter_base_url: non_empty("FC_FRANKFURTER_BASE_URL"),
            http_timeout,
            rate_limit_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, "./db/fincollect.db");
        assert_eq!(config.http_timeout, Duration::from_secs(20));
        assert_eq!(config.rate_limit_attempts, 3);
        assert_eq!(config.polygon_base_url, None);
        assert_eq!(config.frankfurter_base_url, None);
    }

    #[test]
    fn test_db_path_prefers_fc_db_path() {
        let config = config_from(&[("DATABASE_URL", "/tmp/a.db"), ("FC_DB_PATH", "/tmp/b.db")]).unwrap();
        assert_eq!(config.db_path, "/tmp/b.db");

        let config = config_from(&[("DATABASE_URL", "/tmp/a.db"), ("FC_DB_PATH", " ")]).unwrap();
        assert_eq!(config.db_path, "/tmp/a.db");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FC_POLYGON_BASE_URL", "http://localhost:9000"),
            ("FC_HTTP_TIMEOUT_SECS", "5"),
            ("FC_RATE_LIMIT_RETRIES", "4"),
        ])
        .unwrap();
        assert_eq!(config.polygon_base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit_attempts, 4);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config_from(&[("FC_HTTP_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("FC_RATE_LIMIT_RETRIES", "0")]).is_err());
    }
}
