use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};

use super::collection_traits::{CollectionServiceTrait, SourceRunResult};
use crate::errors::Result;
use crate::records::{CollectStats, RecordStore};
use crate::registry::{default_categories, CollectorRegistry};
use crate::sources::{NewSourceConfig, SourceConfig, SourceRepositoryTrait};
use crate::watermark::WatermarkResolver;

pub struct CollectionService {
    registry: Arc<CollectorRegistry>,
    source_repository: Arc<dyn SourceRepositoryTrait>,
    record_store: Arc<dyn RecordStore>,
    watermark: WatermarkResolver,
}

impl CollectionService {
    pub fn new(
        registry: Arc<CollectorRegistry>,
        source_repository: Arc<dyn SourceRepositoryTrait>,
        record_store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            registry,
            source_repository,
            watermark: WatermarkResolver::new(record_store.clone()),
            record_store,
        }
    }
}

#[async_trait]
impl CollectionServiceTrait for CollectionService {
    async fn initialize(&self) -> Result<()> {
        let inserted = self
            .source_repository
            .seed_default_categories(default_categories())
            .await?;
        if inserted > 0 {
            info!("Seeded {} default source type mappings", inserted);
        }
        Ok(())
    }

    async fn register_source(&self, new_source: NewSourceConfig) -> Result<SourceConfig> {
        new_source.validate()?;
        let source = self.source_repository.create_source(new_source).await?;
        info!(
            "Registered source {} ({} '{}') -> {}",
            source.source_id, source.source_type, source.url_additional, source.end_table
        );
        Ok(source)
    }

    fn get_source(&self, source_id: i64) -> Result<SourceConfig> {
        self.source_repository.get_source(source_id)
    }

    fn list_sources(&self) -> Result<Vec<SourceConfig>> {
        self.source_repository.list_sources()
    }

    async fn collect(&self, config: &SourceConfig) -> Result<CollectStats> {
        let category = config.category()?;
        let collector = self.registry.get(&config.source_type)?;
        let since = self
            .watermark
            .resolve(config.source_id, category, config.scrape_since)?;

        info!(
            "Collecting source {} ({} '{}') since {}",
            config.source_id,
            config.source_type,
            config.url_additional,
            since.format("%Y-%m-%d")
        );

        let batch = collector.collect_records(config, since).await?;
        let written = self
            .record_store
            .write_records(batch.records, category)
            .await?;
        let stats = CollectStats::new(written, batch.skipped);

        info!("Source {} stats: {}", config.source_id, stats);
        Ok(stats)
    }

    async fn collect_source(&self, source_id: i64) -> Result<CollectStats> {
        let config = self.source_repository.get_source(source_id)?;
        self.collect(&config).await
    }

    async fn collect_all(&self) -> Result<Vec<SourceRunResult>> {
        let sources = self.source_repository.list_sources()?;
        let mut results = Vec::with_capacity(sources.len());

        for config in &sources {
            let result = self.collect(config).await;
            if let Err(e) = &result {
                error!("Collection failed for source {}: {}", config.source_id, e);
            }
            results.push(SourceRunResult {
                source_id: config.source_id,
                result,
            });
        }

        Ok(results)
    }
}
