use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::upload::UploadFile;

/// Payload sent to `POST /auth/financing-requests`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancingRequestFormData {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub governorate_id: i32,
    pub area_id: Option<i32>,
    pub occupation_type: String,
    pub monthly_income: String,
    pub job_title: String,
    pub car_brand: String,
    pub car_model: String,
    pub model_year: String,
    pub preferred_brand: Option<String>,
    pub car_price: Decimal,
    pub down_payment: Decimal,
    pub card_front: Option<UploadFile>,
    pub card_back: Option<UploadFile>,
}

/// Success envelope returned by the financing endpoint.
///
/// `can_apply == false` means the applicant already has a request in
/// process; it is a normal response, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingRequestResponse {
    pub can_apply: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl FinancingRequestResponse {
    /// Id of the created request, when the backend echoes it back.
    pub fn request_id(&self) -> Option<i64> {
        self.data.as_ref()?.get("id")?.as_i64()
    }

    /// Server message, ignoring blank strings.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Body the backend sends alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}
