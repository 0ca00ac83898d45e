use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::memory::MemoryStore;
use super::store::{KeyValueStore, StorageError};

/// Which storage backend to open and how to reach it.
///
/// `backend` selects a registered [`StorageFactory`] by name.
/// `connection_string` is handed to that factory as-is:
///
/// | backend   | connection_string examples            |
/// |-----------|---------------------------------------|
/// | `memory`  | ignored                               |
/// | `sqlite`  | `finance.db`, `sqlite::memory:`       |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: MemoryStorageFactory::NAME.to_string(),
            connection_string: String::new(),
        }
    }
}

/// Opens one kind of [`KeyValueStore`]. Backend crates export one of these
/// and the application registers it with a [`StorageRegistry`] on startup.
#[async_trait]
pub trait StorageFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Open the store. Backends that need a schema create it here.
    async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn KeyValueStore>, StorageError>;
}

/// Built-in factory for [`MemoryStore`]; always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStorageFactory;

impl MemoryStorageFactory {
    pub const NAME: &'static str = "memory";
}

#[async_trait]
impl StorageFactory for MemoryStorageFactory {
    fn backend_name(&self) -> &'static str {
        Self::NAME
    }

    async fn create(
        &self,
        _config: &StorageConfig,
    ) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        Ok(Arc::new(MemoryStore::new()))
    }
}

/// Storage factories keyed by backend name.
pub struct StorageRegistry {
    factories: HashMap<&'static str, Box<dyn StorageFactory>>,
}

impl StorageRegistry {
    /// An empty registry. See [`StorageRegistry::with_memory`] for one that
    /// already knows the in-memory backend.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryStorageFactory));
        registry
    }

    /// A later registration under the same name replaces the earlier one.
    pub fn register(
        &mut self,
        factory: Box<dyn StorageFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, alphabetical.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Open the store named by `config.backend`.
    ///
    /// # Errors
    /// [`StorageError::Configuration`] when no factory has that name;
    /// otherwise whatever the factory returns.
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(StorageError::Configuration(format!(
                "unknown storage backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        tracing::debug!(backend = %config.backend, "opening key-value store");
        factory.create(config).await
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
