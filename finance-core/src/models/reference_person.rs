use serde::{Deserialize, Serialize};

use super::section::{SectionForm, UnknownFieldError, is_blank};

/// Car selection and pricing section.
///
/// `has_specific_car` is kept as the raw `"yes"`/`"no"`/`""` string so
/// stored snapshots stay compatible with the web client; use
/// [`ReferencePerson::car_choice`] for a typed view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferencePerson {
    pub total_price: String,
    pub down_payment: String,
    pub has_specific_car: String,

    // Filled when the applicant already knows the car.
    pub specific_car_brand: String,
    pub specific_car_model: String,
    pub specific_car_year: String,
    pub specific_car_price: String,

    // Filled when the applicant is still searching.
    pub selected_car_types: Vec<String>,
    pub search_car_brand: String,
    pub search_car_model: String,
}

/// Answer to "do you have a specific car in mind?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarChoice {
    Specific,
    Search,
    Unanswered,
}

impl CarChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Specific => "yes",
            Self::Search => "no",
            Self::Unanswered => "",
        }
    }

    /// Parse the stored answer. Anything other than `yes`, `no` or blank
    /// is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "yes" => Some(Self::Specific),
            "no" => Some(Self::Search),
            "" => Some(Self::Unanswered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    TotalPrice,
    DownPayment,
    HasSpecificCar,
    SpecificCarBrand,
    SpecificCarModel,
    SpecificCarYear,
    SpecificCarPrice,
    SearchCarBrand,
    SearchCarModel,
}

impl ReferenceField {
    pub const ALL: [ReferenceField; 9] = [
        Self::TotalPrice,
        Self::DownPayment,
        Self::HasSpecificCar,
        Self::SpecificCarBrand,
        Self::SpecificCarModel,
        Self::SpecificCarYear,
        Self::SpecificCarPrice,
        Self::SearchCarBrand,
        Self::SearchCarModel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalPrice => "totalPrice",
            Self::DownPayment => "downPayment",
            Self::HasSpecificCar => "hasSpecificCar",
            Self::SpecificCarBrand => "specificCarBrand",
            Self::SpecificCarModel => "specificCarModel",
            Self::SpecificCarYear => "specificCarYear",
            Self::SpecificCarPrice => "specificCarPrice",
            Self::SearchCarBrand => "searchCarBrand",
            Self::SearchCarModel => "searchCarModel",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownFieldError> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFieldError {
                section: ReferencePerson::SECTION_NAME,
                name: s.to_string(),
            })
    }
}

impl ReferencePerson {
    /// Typed view of `has_specific_car`; `None` for corrupt values.
    pub fn car_choice(&self) -> Option<CarChoice> {
        CarChoice::parse(&self.has_specific_car)
    }

    /// Add a car type unless it is already selected.
    pub fn add_car_type(
        &mut self,
        car_type: &str,
    ) {
        if !self.selected_car_types.iter().any(|t| t == car_type) {
            self.selected_car_types.push(car_type.to_string());
        }
    }

    pub fn remove_car_type(
        &mut self,
        car_type: &str,
    ) {
        self.selected_car_types.retain(|t| t != car_type);
    }
}

impl SectionForm for ReferencePerson {
    type Field = ReferenceField;

    const STORAGE_KEY: &'static str = "finance_reference_person_data";
    const SECTION_NAME: &'static str = "reference person";

    fn set_field(
        &mut self,
        field: ReferenceField,
        value: String,
    ) {
        let slot = match field {
            ReferenceField::TotalPrice => &mut self.total_price,
            ReferenceField::DownPayment => &mut self.down_payment,
            ReferenceField::HasSpecificCar => &mut self.has_specific_car,
            ReferenceField::SpecificCarBrand => &mut self.specific_car_brand,
            ReferenceField::SpecificCarModel => &mut self.specific_car_model,
            ReferenceField::SpecificCarYear => &mut self.specific_car_year,
            ReferenceField::SpecificCarPrice => &mut self.specific_car_price,
            ReferenceField::SearchCarBrand => &mut self.search_car_brand,
            ReferenceField::SearchCarModel => &mut self.search_car_model,
        };
        *slot = value;
    }

    fn field(
        &self,
        field: ReferenceField,
    ) -> &str {
        match field {
            ReferenceField::TotalPrice => &self.total_price,
            ReferenceField::DownPayment => &self.down_payment,
            ReferenceField::HasSpecificCar => &self.has_specific_car,
            ReferenceField::SpecificCarBrand => &self.specific_car_brand,
            ReferenceField::SpecificCarModel => &self.specific_car_model,
            ReferenceField::SpecificCarYear => &self.specific_car_year,
            ReferenceField::SpecificCarPrice => &self.specific_car_price,
            ReferenceField::SearchCarBrand => &self.search_car_brand,
            ReferenceField::SearchCarModel => &self.search_car_model,
        }
    }

    fn has_data(&self) -> bool {
        !self.selected_car_types.is_empty()
            || ReferenceField::ALL.iter().any(|f| !is_blank(self.field(*f)))
    }

    fn is_complete(&self) -> bool {
        if is_blank(&self.total_price) || is_blank(&self.down_payment) {
            return false;
        }

        match self.car_choice() {
            Some(CarChoice::Specific) => [
                &self.specific_car_brand,
                &self.specific_car_model,
                &self.specific_car_year,
                &self.specific_car_price,
            ]
            .iter()
            .all(|v| !is_blank(v)),
            Some(CarChoice::Search) => {
                !self.selected_car_types.is_empty()
                    && !is_blank(&self.search_car_brand)
                    && !is_blank(&self.search_car_model)
            }
            Some(CarChoice::Unanswered) | None => false,
        }
    }
}
