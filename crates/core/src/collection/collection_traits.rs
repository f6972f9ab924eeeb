use async_trait::async_trait;

use crate::errors::Result;
use crate::records::CollectStats;
use crate::sources::{NewSourceConfig, SourceConfig};

/// Outcome of one source within a `collect_all` run.
#[derive(Debug)]
pub struct SourceRunResult {
    pub source_id: i64,
    pub result: Result<CollectStats>,
}

/// Trait defining the contract for collection operations.
#[async_trait]
pub trait CollectionServiceTrait: Send + Sync {
    /// Seeds the default source-type categories. Safe to call on every start.
    async fn initialize(&self) -> Result<()>;

    async fn register_source(&self, new_source: NewSourceConfig) -> Result<SourceConfig>;

    fn get_source(&self, source_id: i64) -> Result<SourceConfig>;

    fn list_sources(&self) -> Result<Vec<SourceConfig>>;

    /// Runs one incremental collection for `config`.
    async fn collect(&self, config: &SourceConfig) -> Result<CollectStats>;

    /// Loads the stored configuration for `source_id` and collects it.
    async fn collect_source(&self, source_id: i64) -> Result<CollectStats>;

    /// Collects every registered source in id order. A failing source is
    /// reported in its result and does not stop the others.
    async fn collect_all(&self) -> Result<Vec<SourceRunResult>>;
}
