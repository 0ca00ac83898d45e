mod factory;
mod store;

pub use factory::SqliteStorageFactory;
pub use store::SqliteKeyValueStore;
