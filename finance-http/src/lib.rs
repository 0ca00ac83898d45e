//! reqwest-backed transports for the financing client: reference-data
//! lookups, multipart submission and the auth endpoints.

mod auth_api;
mod backend;
mod config;
mod envelope;
mod error;

pub use auth_api::AuthApi;
pub use backend::{
    AUTH_ENDPOINTS, FINANCING_REQUESTS_PATH, HttpBackend, REQUEST_STATUS_PATH, is_auth_endpoint,
};
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use envelope::MessageResponse;
pub use error::HttpError;
