use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use finance_core::auth::{AuthGate, TokenSession};
use finance_core::collection::DataCollection;
use finance_core::lookup::{CarModelCache, GovernorateCache, LookupSource, UniversityCache};
use finance_core::storage::{KeyValueStore, StorageRegistry};
use finance_core::submit::{FinancingRequestSubmitter, FinancingTransport};
use finance_core::wizard::FinanceWizard;
use finance_db_sqlite::SqliteStorageFactory;
use finance_http::{AuthApi, HttpBackend};

use crate::config::AppConfig;

/// Storage backends this binary can open.
pub fn build_registry() -> StorageRegistry {
    let mut registry = StorageRegistry::with_memory();
    registry.register(Box::new(SqliteStorageFactory));
    registry
}

/// Every service a command might need, wired over one storage backend
/// and one HTTP client.
pub struct App {
    pub config: AppConfig,
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<TokenSession>,
    pub auth: AuthApi,
    pub backend: HttpBackend,
    pub governorates: GovernorateCache,
    pub car_models: CarModelCache,
    pub universities: UniversityCache,
    pub wizard: FinanceWizard,
}

impl App {
    pub async fn open(config: AppConfig) -> Result<Self> {
        debug!(backend = %config.storage.backend, "opening storage");
        let storage = build_registry()
            .create(&config.storage)
            .await
            .with_context(|| format!("cannot open '{}' storage", config.storage.backend))?;
        Self::with_storage(config, storage).await
    }

    pub async fn with_storage(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let session = Arc::new(TokenSession::load(Arc::clone(&storage)).await);
        let backend = HttpBackend::new(config.api.clone())
            .context("cannot build HTTP client")?
            .with_session(Arc::clone(&session));

        let source: Arc<dyn LookupSource> = Arc::new(backend.clone());
        let transport: Arc<dyn FinancingTransport> = Arc::new(backend.clone());
        let submitter = FinancingRequestSubmitter::new(transport)
            .with_max_upload_bytes(config.uploads.max_upload_bytes);
        let gate: Arc<dyn AuthGate> = session.clone();

        let wizard = FinanceWizard::new(
            DataCollection::load(Arc::clone(&storage)).await,
            Arc::new(submitter),
            gate,
            config.wizard.to_wizard_config(),
        );

        Ok(Self {
            auth: AuthApi::new(backend.clone(), Arc::clone(&session)),
            backend,
            governorates: GovernorateCache::new(Arc::clone(&source)),
            car_models: CarModelCache::new(Arc::clone(&source)),
            universities: UniversityCache::new(source),
            config,
            storage,
            session,
            wizard,
        })
    }

    pub fn collection(&self) -> &DataCollection {
        self.wizard.collection()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use finance_core::StorageConfig;

    use super::*;

    #[test]
    fn registry_knows_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn opens_with_default_config() {
        let app = App::open(AppConfig::default()).await.unwrap();
        assert!(!app.session.is_authenticated());
        assert_eq!(app.wizard.snapshot().current_step, 0);
    }

    #[tokio::test]
    async fn unknown_backend_is_reported() {
        let config = AppConfig {
            storage: StorageConfig {
                backend: "postgres".to_string(),
                connection_string: String::new(),
            },
            ..AppConfig::default()
        };
        let err = App::open(config).await.err().unwrap();
        assert_eq!(err.to_string(), "cannot open 'postgres' storage");
    }
}
