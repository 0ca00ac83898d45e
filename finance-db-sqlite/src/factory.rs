use std::sync::Arc;

use async_trait::async_trait;

use finance_core::storage::{KeyValueStore, StorageConfig, StorageError, StorageFactory};

use crate::store::SqliteKeyValueStore;

/// [`StorageFactory`] for SQLite.
///
/// ```rust,no_run
/// use finance_core::storage::StorageRegistry;
/// use finance_db_sqlite::SqliteStorageFactory;
///
/// let mut registry = StorageRegistry::with_memory();
/// registry.register(Box::new(SqliteStorageFactory));
/// ```
pub struct SqliteStorageFactory;

impl SqliteStorageFactory {
    pub const NAME: &'static str = "sqlite";
}

#[async_trait]
impl StorageFactory for SqliteStorageFactory {
    fn backend_name(&self) -> &'static str {
        Self::NAME
    }

    /// `config.connection_string` may be a file path (created if missing),
    /// `:memory:`, or a full `sqlite:` URL. Migrations run before the
    /// store is returned.
    async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        let store = SqliteKeyValueStore::new(&config.connection_string).await?;
        store.run_migrations().await?;
        Ok(Arc::new(store))
    }
}
