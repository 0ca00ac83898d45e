use std::fmt;

/// A required input the applicant has not provided yet.
///
/// Keys are the translation identifiers the front ends already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingField {
    FullName,
    PhoneNumber,
    EmailAddress,
    Governorate,
    OccupationType,
    JobTitle,
    MonthlyIncome,
    CarPrice,
    DownPayment,
    SpecificCarQuestion,
    CarBrand,
    CarModel,
    CarModelYear,
    /// Blank price of the chosen car; reported under the same key as
    /// [`MissingField::CarPrice`].
    SpecificCarPrice,
    CarTypesMultiple,
    SelectCarBrand,
    SelectCarModel,
}

impl MissingField {
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::FullName => "FULL_NAME",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::Governorate => "GOVERNORATE",
            Self::OccupationType => "OCCUPATION_TYPE",
            Self::JobTitle => "JOB_TITLE",
            Self::MonthlyIncome => "MONTHLY_INCOME",
            Self::CarPrice => "CAR_PRICE",
            Self::DownPayment => "DOWN_PAYMENT",
            Self::SpecificCarQuestion => "SPECIFIC_CAR_QUESTION",
            Self::CarBrand => "CAR_BRAND",
            Self::CarModel => "CAR_MODEL",
            Self::CarModelYear => "CAR_MODEL_YEAR",
            Self::SpecificCarPrice => "CAR_PRICE",
            Self::CarTypesMultiple => "CAR_TYPES_MULTIPLE",
            Self::SelectCarBrand => "SELECT_CAR_BRAND",
            Self::SelectCarModel => "SELECT_CAR_MODEL",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Result of the cross-section completeness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completeness {
    pub is_complete: bool,
    /// Every gap, in form order.
    pub missing_fields: Vec<MissingField>,
}

impl Completeness {
    pub(crate) fn from_missing(missing_fields: Vec<MissingField>) -> Self {
        Self {
            is_complete: missing_fields.is_empty(),
            missing_fields,
        }
    }

    /// Missing keys joined with `", "`.
    pub fn missing_keys(&self) -> String {
        self.missing_fields
            .iter()
            .map(MissingField::as_key)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
