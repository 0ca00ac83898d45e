use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CarChoice, DEFAULT_AREA_ID, FinancingRequestFormData, PersonalInformation, ReferencePerson,
    UploadFile, WorkDetails, governorate_id_for_name, is_blank,
};
use crate::storage::KeyValueStore;
use crate::store::{PersonalInformationStore, ReferencePersonStore, WorkDetailsStore};

use super::amount::parse_amount;
use super::missing::{Completeness, MissingField};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("unrecognised answer to the specific-car question: '{0}'")]
    InvalidCarChoice(String),
}

/// Read-only view of all three sections at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedFormData {
    pub personal_info: PersonalInformation,
    pub work_details: WorkDetails,
    pub reference_person: ReferencePerson,
}

/// Applicant identity to put on the request.
///
/// Blank fields fall back to what the personal-information step holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
}

impl From<&PersonalInformation> for ContactInfo {
    fn from(personal: &PersonalInformation) -> Self {
        Self {
            full_name: personal.full_name.clone(),
            phone_number: personal.phone_number.clone(),
            email: personal.email.clone(),
        }
    }
}

fn prefer(
    contact: &str,
    fallback: &str,
) -> String {
    if is_blank(contact) {
        fallback.to_string()
    } else {
        contact.to_string()
    }
}

/// Reads the three section stores as one application.
#[derive(Clone)]
pub struct DataCollection {
    personal: Arc<PersonalInformationStore>,
    work: Arc<WorkDetailsStore>,
    reference: Arc<ReferencePersonStore>,
}

impl DataCollection {
    pub fn new(
        personal: Arc<PersonalInformationStore>,
        work: Arc<WorkDetailsStore>,
        reference: Arc<ReferencePersonStore>,
    ) -> Self {
        Self {
            personal,
            work,
            reference,
        }
    }

    /// Load all three sections from the same storage.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            Arc::new(PersonalInformationStore::load(storage.clone()).await),
            Arc::new(WorkDetailsStore::load(storage.clone()).await),
            Arc::new(ReferencePersonStore::load(storage).await),
        )
    }

    pub fn personal(&self) -> &Arc<PersonalInformationStore> {
        &self.personal
    }

    pub fn work(&self) -> &Arc<WorkDetailsStore> {
        &self.work
    }

    pub fn reference(&self) -> &Arc<ReferencePersonStore> {
        &self.reference
    }

    pub fn collect_all_form_data(&self) -> CombinedFormData {
        CombinedFormData {
            personal_info: self.personal.form_data(),
            work_details: self.work.form_data(),
            reference_person: self.reference.form_data(),
        }
    }

    /// Check every field the backend requires, across all sections.
    ///
    /// Work details only need occupation, job title and income here; the
    /// other work fields are optional for submission.
    pub fn is_all_data_complete(&self) -> Completeness {
        let data = self.collect_all_form_data();
        let mut missing = Vec::new();
        let mut require = |value: &str, field: MissingField| {
            if is_blank(value) {
                missing.push(field);
            }
        };

        let personal = &data.personal_info;
        require(&personal.full_name, MissingField::FullName);
        require(&personal.phone_number, MissingField::PhoneNumber);
        require(&personal.email, MissingField::EmailAddress);
        require(&personal.governorate, MissingField::Governorate);

        let work = &data.work_details;
        require(&work.occupation_type, MissingField::OccupationType);
        require(&work.job_title, MissingField::JobTitle);
        require(&work.monthly_income, MissingField::MonthlyIncome);

        let car = &data.reference_person;
        require(&car.total_price, MissingField::CarPrice);
        require(&car.down_payment, MissingField::DownPayment);
        require(&car.has_specific_car, MissingField::SpecificCarQuestion);

        match car.car_choice() {
            Some(CarChoice::Specific) => {
                require(&car.specific_car_brand, MissingField::CarBrand);
                require(&car.specific_car_model, MissingField::CarModel);
                require(&car.specific_car_year, MissingField::CarModelYear);
                require(&car.specific_car_price, MissingField::SpecificCarPrice);
            }
            Some(CarChoice::Search) => {
                if car.selected_car_types.is_empty() {
                    missing.push(MissingField::CarTypesMultiple);
                }
                if is_blank(&car.search_car_brand) {
                    missing.push(MissingField::SelectCarBrand);
                }
                if is_blank(&car.search_car_model) {
                    missing.push(MissingField::SelectCarModel);
                }
            }
            Some(CarChoice::Unanswered) | None => {}
        }

        Completeness::from_missing(missing)
    }

    /// Build the backend payload from the current sections.
    ///
    /// Attachments are included only when given. Completeness is not
    /// checked here; callers run [`DataCollection::is_all_data_complete`]
    /// first.
    ///
    /// # Errors
    /// [`CollectionError::InvalidCarChoice`] when the stored answer to the
    /// specific-car question is neither `yes`, `no` nor blank.
    pub fn convert_to_financing_request_data(
        &self,
        card_front: Option<UploadFile>,
        card_back: Option<UploadFile>,
        contact: &ContactInfo,
    ) -> Result<FinancingRequestFormData, CollectionError> {
        let data = self.collect_all_form_data();
        let personal = &data.personal_info;
        let work = &data.work_details;
        let car = &data.reference_person;

        let choice = car
            .car_choice()
            .ok_or_else(|| CollectionError::InvalidCarChoice(car.has_specific_car.clone()))?;

        let (car_brand, car_model, model_year, car_price, preferred_brand) = match choice {
            CarChoice::Specific => (
                car.specific_car_brand.clone(),
                car.specific_car_model.clone(),
                car.specific_car_year.clone(),
                parse_amount(&car.specific_car_price),
                None,
            ),
            CarChoice::Search => (
                car.search_car_brand.clone(),
                car.search_car_model.clone(),
                chrono::Local::now().year().to_string(),
                parse_amount(&car.total_price),
                Some(car.search_car_brand.clone()),
            ),
            CarChoice::Unanswered => (
                String::new(),
                String::new(),
                String::new(),
                Decimal::ZERO,
                None,
            ),
        };

        let governorate_id = governorate_id_for_name(&personal.governorate);
        debug!(
            governorate = %personal.governorate,
            governorate_id,
            choice = choice.as_str(),
            "assembled financing request"
        );

        Ok(FinancingRequestFormData {
            full_name: prefer(&contact.full_name, &personal.full_name),
            phone_number: prefer(&contact.phone_number, &personal.phone_number),
            email: prefer(&contact.email, &personal.email),
            governorate_id,
            area_id: Some(DEFAULT_AREA_ID),
            occupation_type: work.occupation_type.clone(),
            monthly_income: work.monthly_income.clone(),
            job_title: work.job_title.clone(),
            car_brand,
            car_model,
            model_year,
            preferred_brand,
            car_price,
            down_payment: parse_amount(&car.down_payment),
            card_front,
            card_back,
        })
    }

    /// `(front, back)` ID card attachments.
    pub fn uploaded_files(&self) -> (Option<UploadFile>, Option<UploadFile>) {
        self.personal.uploaded_files()
    }

    pub async fn clear_all_data(&self) {
        self.personal.clear_form_data().await;
        self.work.clear_form_data().await;
        self.reference.clear_form_data().await;
    }

    /// Plain-text preview of the application and its validation verdict.
    pub fn summary(&self) -> String {
        let data = self.collect_all_form_data();
        let validation = self.is_all_data_complete();
        let personal = &data.personal_info;
        let work = &data.work_details;
        let car = &data.reference_person;

        // Writing to a String cannot fail.
        let mut out = String::from("Finance Application Summary:\n\n");
        let _ = writeln!(out, "Personal Information:");
        let _ = writeln!(out, "- Name: {}", personal.full_name);
        let _ = writeln!(out, "- Phone: {}", personal.phone_number);
        let _ = writeln!(out, "- Email: {}", personal.email);
        let _ = writeln!(out, "- Governorate: {}\n", personal.governorate);

        let _ = writeln!(out, "Work Details:");
        let _ = writeln!(out, "- Occupation: {}", work.occupation_type);
        let _ = writeln!(out, "- Job: {}", work.job_title);
        let _ = writeln!(out, "- Income: {}\n", work.monthly_income);

        let _ = writeln!(out, "Car Information:");
        let _ = writeln!(out, "- Price: {}", car.total_price);
        let _ = writeln!(out, "- Down Payment: {}", car.down_payment);
        match car.car_choice() {
            Some(CarChoice::Specific) => {
                let _ = writeln!(
                    out,
                    "- Car: {} {} ({})",
                    car.specific_car_brand, car.specific_car_model, car.specific_car_year
                );
            }
            Some(CarChoice::Search) => {
                let _ = writeln!(out, "- Looking for: {}", car.selected_car_types.join(", "));
                let _ = writeln!(
                    out,
                    "- Preferred: {} {}",
                    car.search_car_brand, car.search_car_model
                );
            }
            Some(CarChoice::Unanswered) | None => {}
        }

        if validation.is_complete {
            out.push_str("\nValidation: Complete");
        } else {
            let _ = write!(out, "\nValidation: Missing {}", validation.missing_keys());
        }
        out
    }
}
