mod factory;
mod memory;
mod store;

pub use factory::{MemoryStorageFactory, StorageConfig, StorageFactory, StorageRegistry};
pub use memory::MemoryStore;
pub use store::{KeyValueStore, StorageError};
