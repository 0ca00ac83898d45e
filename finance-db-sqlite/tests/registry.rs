use std::sync::Arc;

use pretty_assertions::assert_eq;

use finance_core::models::{ReferenceField, ReferencePerson, SectionForm};
use finance_core::storage::{KeyValueStore, StorageConfig, StorageRegistry};
use finance_core::store::ReferencePersonStore;
use finance_db_sqlite::SqliteStorageFactory;

fn registry() -> StorageRegistry {
    let mut registry = StorageRegistry::with_memory();
    registry.register(Box::new(SqliteStorageFactory));
    registry
}

#[tokio::test]
async fn sqlite_backend_is_listed() {
    assert_eq!(registry().available_backends(), vec!["memory", "sqlite"]);
}

#[tokio::test]
async fn in_memory_sqlite_store_is_migrated() {
    let config = StorageConfig {
        backend: "sqlite".to_string(),
        connection_string: ":memory:".to_string(),
    };
    let storage = registry().create(&config).await.unwrap();

    storage.set("k", "v").await.unwrap();
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn form_section_survives_reopening_the_file() {
    let path = std::env::temp_dir().join(format!(
        "finance-db-sqlite-{}-{}.db",
        std::process::id(),
        unique_stamp()
    ));
    let config = StorageConfig {
        backend: "sqlite".to_string(),
        connection_string: path.display().to_string(),
    };

    {
        let storage = registry().create(&config).await.unwrap();
        let store = ReferencePersonStore::load(storage).await;
        store.update_field(ReferenceField::TotalPrice, "780000").await;
        store.add_car_type("Crossover").await;
    }

    let storage = registry().create(&config).await.unwrap();
    let raw = storage.get(ReferencePerson::STORAGE_KEY).await.unwrap();
    let reopened = ReferencePersonStore::load(Arc::clone(&storage)).await;

    assert!(raw.is_some());
    assert_eq!(reopened.form_data().total_price, "780000");
    assert_eq!(reopened.form_data().selected_car_types, vec!["Crossover"]);

    let _ = std::fs::remove_file(&path);
}

fn unique_stamp() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}
