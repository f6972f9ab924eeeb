//! Source registry - maps source-type tags to collectors and default
//! storage categories.

use std::collections::HashMap;
use std::sync::Arc;

use fincollect_market_data::{FetchClient, FrankfurterProvider, PolygonProvider};

use crate::collectors::{EquityCollector, ExchangeRateCollector, RecordCollector};
use crate::constants::{SOURCE_TYPE_FRANKFURTER, SOURCE_TYPE_POLYGON};
use crate::errors::{CollectionError, Result};
use crate::records::StorageCategory;

/// Built-in `source_type -> category` defaults, seeded into storage at startup.
pub const DEFAULT_SOURCE_CATEGORIES: &[(&str, StorageCategory)] = &[
    (SOURCE_TYPE_POLYGON, StorageCategory::StockRecords),
    (SOURCE_TYPE_FRANKFURTER, StorageCategory::ExchangeRateRecords),
];

pub fn default_categories() -> Vec<(String, StorageCategory)> {
    DEFAULT_SOURCE_CATEGORIES
        .iter()
        .map(|(source_type, category)| (source_type.to_string(), *category))
        .collect()
}

/// Collectors keyed by source type.
#[derive(Default, Clone)]
pub struct CollectorRegistry {
    collectors: HashMap<String, Arc<dyn RecordCollector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Polygon and Frankfurter collectors.
    pub fn with_defaults(polygon: PolygonProvider, frankfurter: FrankfurterProvider) -> Self {
        let mut registry = Self::new();
        registry.register(SOURCE_TYPE_POLYGON, Arc::new(EquityCollector::new(polygon)));
        registry.register(
            SOURCE_TYPE_FRANKFURTER,
            Arc::new(ExchangeRateCollector::new(frankfurter)),
        );
        registry
    }

    /// Default registry with both providers sharing one fetch client.
    pub fn from_client(client: FetchClient) -> Self {
        Self::with_defaults(
            PolygonProvider::new(client.clone()),
            FrankfurterProvider::new(client),
        )
    }

    /// Adds or replaces the collector for `source_type`.
    pub fn register(&mut self, source_type: impl Into<String>, collector: Arc<dyn RecordCollector>) {
        self.collectors.insert(source_type.into(), collector);
    }

    pub fn get(&self, source_type: &str) -> Result<Arc<dyn RecordCollector>> {
        self.collectors
            .get(source_type)
            .cloned()
            .ok_or_else(|| CollectionError::NoCollector(source_type.to_string()).into())
    }

    pub fn contains(&self, source_type: &str) -> bool {
        self.collectors.contains_key(source_type)
    }

    pub fn source_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.collectors.keys().cloned().collect();
        types.sort();
        types
    }
}
