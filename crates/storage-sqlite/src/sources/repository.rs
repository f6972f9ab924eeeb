use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use fincollect_core::errors::{CollectionError, Result};
use fincollect_core::records::StorageCategory;
use fincollect_core::sources::{NewSourceConfig, SourceConfig, SourceRepositoryTrait};

use super::model::{NewSourceTypeCategoryDB, SourceConfigDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{source_type_end_table, sources};

pub struct SourceRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SourceRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn lookup_default_category(
    conn: &mut SqliteConnection,
    source_type: &str,
) -> std::result::Result<Option<String>, StorageError> {
    Ok(source_type_end_table::table
        .filter(source_type_end_table::source_type.eq(source_type))
        .select(source_type_end_table::end_table)
        .first::<String>(conn)
        .optional()?)
}

#[async_trait]
impl SourceRepositoryTrait for SourceRepository {
    async fn seed_default_categories(
        &self,
        defaults: Vec<(String, StorageCategory)>,
    ) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let rows: Vec<NewSourceTypeCategoryDB> = defaults
                    .into_iter()
                    .map(|(source_type, category)| NewSourceTypeCategoryDB {
                        source_type,
                        end_table: category.to_string(),
                    })
                    .collect();

                let mut inserted = 0;
                for row in &rows {
                    inserted += diesel::insert_or_ignore_into(source_type_end_table::table)
                        .values(row)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(inserted)
            })
            .await
    }

    async fn create_source(&self, new_source: NewSourceConfig) -> Result<SourceConfig> {
        self.writer
            .exec(move |conn| {
                let exists = sources::table
                    .find(new_source.source_id)
                    .select(sources::source_id)
                    .first::<i64>(conn)
                    .optional()
                    .into_core()?
                    .is_some();
                if exists {
                    return Err(CollectionError::DuplicateSource(new_source.source_id).into());
                }

                let end_table = match new_source.explicit_end_table() {
                    Some(end_table) => end_table.to_string(),
                    None => lookup_default_category(conn, new_source.source_type.trim())?
                        .ok_or_else(|| {
                            CollectionError::UnknownSourceType(new_source.source_type.clone())
                        })?,
                };

                let config = new_source.into_config(end_table);
                diesel::insert_into(sources::table)
                    .values(SourceConfigDB::from(&config))
                    .execute(conn)
                    .into_core()?;
                Ok(config)
            })
            .await
    }

    fn get_source(&self, source_id: i64) -> Result<SourceConfig> {
        let mut conn = get_connection(&self.pool)?;
        let row = sources::table
            .find(source_id)
            .select(SourceConfigDB::as_select())
            .first::<SourceConfigDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or(CollectionError::NotFound(source_id))?;
        SourceConfig::try_from(row)
    }

    fn list_sources(&self) -> Result<Vec<SourceConfig>> {
        let mut conn = get_connection(&self.pool)?;
        sources::table
            .order(sources::source_id.asc())
            .select(SourceConfigDB::as_select())
            .load::<SourceConfigDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(SourceConfig::try_from)
            .collect()
    }

    fn default_category_for(&self, source_type: &str) -> Result<Option<StorageCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let end_table = lookup_default_category(&mut conn, source_type)?;
        Ok(end_table
            .map(|tag| tag.parse::<StorageCategory>())
            .transpose()?)
    }
}
