use serde::{Deserialize, Serialize};

use super::section::{SectionForm, UnknownFieldError, is_blank};
use super::upload::UploadFile;

/// Step-one applicant details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInformation {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub governorate: String,

    // National ID photos; optional and session-only.
    #[serde(skip)]
    pub card_front_file: Option<UploadFile>,
    #[serde(skip)]
    pub card_back_file: Option<UploadFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    PhoneNumber,
    Email,
    Governorate,
}

impl PersonalField {
    pub const ALL: [PersonalField; 4] = [
        Self::FullName,
        Self::PhoneNumber,
        Self::Email,
        Self::Governorate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::Governorate => "governorate",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownFieldError> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFieldError {
                section: PersonalInformation::SECTION_NAME,
                name: s.to_string(),
            })
    }
}

impl SectionForm for PersonalInformation {
    type Field = PersonalField;

    const STORAGE_KEY: &'static str = "finance_personal_info_data";
    const SECTION_NAME: &'static str = "personal information";

    fn set_field(
        &mut self,
        field: PersonalField,
        value: String,
    ) {
        match field {
            PersonalField::FullName => self.full_name = value,
            PersonalField::PhoneNumber => self.phone_number = value,
            PersonalField::Email => self.email = value,
            PersonalField::Governorate => self.governorate = value,
        }
    }

    fn field(
        &self,
        field: PersonalField,
    ) -> &str {
        match field {
            PersonalField::FullName => &self.full_name,
            PersonalField::PhoneNumber => &self.phone_number,
            PersonalField::Email => &self.email,
            PersonalField::Governorate => &self.governorate,
        }
    }

    fn has_data(&self) -> bool {
        PersonalField::ALL.iter().any(|f| !is_blank(self.field(*f)))
    }

    /// ID photos are optional and never count towards completeness.
    fn is_complete(&self) -> bool {
        PersonalField::ALL.iter().all(|f| !is_blank(self.field(*f)))
    }
}
