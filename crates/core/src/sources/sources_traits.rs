use async_trait::async_trait;

use super::sources_model::{NewSourceConfig, SourceConfig};
use crate::errors::Result;
use crate::records::StorageCategory;

/// Trait defining the contract for source configuration storage.
#[async_trait]
pub trait SourceRepositoryTrait: Send + Sync {
    /// Stores each `(source_type, category)` pair unless the source type
    /// already has a mapping. Returns the number of pairs inserted.
    async fn seed_default_categories(
        &self,
        defaults: Vec<(String, StorageCategory)>,
    ) -> Result<usize>;

    /// Persists a new source. Fails with `DuplicateSource` if the id is taken
    /// and with `UnknownSourceType` if `end_table` is empty and the source
    /// type has no stored default.
    async fn create_source(&self, new_source: NewSourceConfig) -> Result<SourceConfig>;

    /// Fails with `NotFound` if no source has this id.
    fn get_source(&self, source_id: i64) -> Result<SourceConfig>;

    fn list_sources(&self) -> Result<Vec<SourceConfig>>;

    fn default_category_for(&self, source_type: &str) -> Result<Option<StorageCategory>>;
}
