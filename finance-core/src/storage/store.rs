use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Device-local string storage, one value per key.
///
/// Plays the role browser local storage plays for the web client: form
/// sections and the auth session each write under their own key, so
/// writers never collide.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key has never been written or was removed.
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StorageError>;
}
