use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CarModel, Faculty, Governorate, University};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Could not decode response: {0}")]
    Decode(String),
}

/// Where reference data comes from. The HTTP backend implements this; tests
/// use canned lists.
#[async_trait]
pub trait LookupSource: Send + Sync {
    async fn fetch_governorates(&self) -> Result<Vec<Governorate>, LookupError>;

    async fn fetch_car_models(&self) -> Result<Vec<CarModel>, LookupError>;

    async fn fetch_universities(&self) -> Result<Vec<University>, LookupError>;

    async fn fetch_faculties(&self) -> Result<Vec<Faculty>, LookupError>;
}
