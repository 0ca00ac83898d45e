use serde::{Deserialize, Serialize};

/// One of the applicant's earlier financing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceRequest {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub price: String,
    /// Backend status string, e.g. `pending`, `approved`, `rejected`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u32,
    pub last_page: u32,
}

/// Answer of `GET /auth/requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceRequestsResponse {
    /// `false` while one of the listed requests is still being processed.
    pub can_apply: bool,
    #[serde(default)]
    pub data: Vec<FinanceRequest>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}
