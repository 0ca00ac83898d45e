use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::models::{FinancingRequestFormData, FinancingRequestResponse, UploadFile, is_blank};

use super::classify::{ClassificationRules, SubmitError, TransportError, classify};
use super::multipart::MultipartForm;
use super::validation::{CardSide, DEFAULT_MAX_UPLOAD_BYTES, validate_upload};

/// Delivers a financing request to the backend.
#[async_trait]
pub trait FinancingTransport: Send + Sync {
    async fn send_financing_request(
        &self,
        form: MultipartForm,
    ) -> Result<FinancingRequestResponse, TransportError>;
}

/// Validates, encodes and sends financing requests. No retries.
pub struct FinancingRequestSubmitter {
    transport: Arc<dyn FinancingTransport>,
    max_upload_bytes: u64,
    rules: ClassificationRules,
}

impl FinancingRequestSubmitter {
    pub fn new(transport: Arc<dyn FinancingTransport>) -> Self {
        Self {
            transport,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rules: ClassificationRules::default(),
        }
    }

    pub fn with_max_upload_bytes(
        mut self,
        max_upload_bytes: u64,
    ) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_rules(
        mut self,
        rules: ClassificationRules,
    ) -> Self {
        self.rules = rules;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Encode the payload as multipart fields.
    ///
    /// The twelve required fields come first in a fixed order, then
    /// `area_id` and `preferred_brand` when set, then the non-empty
    /// attachments. Attachments are validated here, so an invalid one
    /// stops the request before anything is sent.
    pub fn build_form(
        &self,
        payload: &FinancingRequestFormData,
    ) -> Result<MultipartForm, SubmitError> {
        let mut form = MultipartForm::new();
        form.text("full_name", payload.full_name.as_str())
            .text("phone_number", payload.phone_number.as_str())
            .text("email", payload.email.as_str())
            .text("governorate_id", payload.governorate_id.to_string())
            .text("occupation_type", payload.occupation_type.as_str())
            .text("monthly_income", payload.monthly_income.as_str())
            .text("job_title", payload.job_title.as_str())
            .text("car_brand", payload.car_brand.as_str())
            .text("car_model", payload.car_model.as_str())
            .text("model_year", payload.model_year.as_str())
            .text("car_price", payload.car_price.normalize().to_string())
            .text("down_payment", payload.down_payment.normalize().to_string());

        if let Some(area_id) = payload.area_id.filter(|id| *id != 0) {
            form.text("area_id", area_id.to_string());
        }
        if let Some(brand) = payload.preferred_brand.as_deref().filter(|b| !is_blank(b)) {
            form.text("preferred_brand", brand);
        }

        for (side, file) in [
            (CardSide::Front, &payload.card_front),
            (CardSide::Back, &payload.card_back),
        ] {
            if let Some(file) = file.as_ref().filter(|f| !f.is_empty()) {
                self.attach(&mut form, side, file)?;
            }
        }

        Ok(form)
    }

    /// Send one request.
    ///
    /// `can_apply == false` comes back as `Ok`; only transport failures
    /// and invalid attachments are errors.
    pub async fn submit_financing_request(
        &self,
        payload: &FinancingRequestFormData,
    ) -> Result<FinancingRequestResponse, SubmitError> {
        let form = self.build_form(payload)?;
        debug!(fields = ?form.field_names(), "sending financing request");

        match self.transport.send_financing_request(form).await {
            Ok(response) => {
                info!(
                    can_apply = response.can_apply,
                    request_id = ?response.request_id(),
                    "financing request answered"
                );
                Ok(response)
            }
            Err(transport_error) => {
                let classified = classify(transport_error, &self.rules);
                match &classified {
                    SubmitError::AlreadyInProgress(_) => {
                        info!("financing request already in process");
                    }
                    other => error!(error = %other, "financing request failed"),
                }
                Err(classified)
            }
        }
    }

    fn attach(
        &self,
        form: &mut MultipartForm,
        side: CardSide,
        file: &UploadFile,
    ) -> Result<(), SubmitError> {
        validate_upload(file, self.max_upload_bytes)
            .map_err(|source| SubmitError::InvalidAttachment { side, source })?;
        debug!(
            side = side.label(),
            file_name = %file.file_name,
            mime_type = %file.mime_type,
            size = file.size(),
            "attaching ID card photo"
        );
        form.file(side.field_name(), file.clone());
        Ok(())
    }
}
