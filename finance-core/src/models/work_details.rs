use serde::{Deserialize, Serialize};

use super::section::{SectionForm, UnknownFieldError, is_blank};

/// Employment details collected alongside the personal information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkDetails {
    pub occupation_type: String,
    pub job_title: String,
    pub monthly_income: String,
    pub work_experience: String,
    pub work_address: String,
    pub work_phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkField {
    OccupationType,
    JobTitle,
    MonthlyIncome,
    WorkExperience,
    WorkAddress,
    WorkPhone,
}

impl WorkField {
    pub const ALL: [WorkField; 6] = [
        Self::OccupationType,
        Self::JobTitle,
        Self::MonthlyIncome,
        Self::WorkExperience,
        Self::WorkAddress,
        Self::WorkPhone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OccupationType => "occupationType",
            Self::JobTitle => "jobTitle",
            Self::MonthlyIncome => "monthlyIncome",
            Self::WorkExperience => "workExperience",
            Self::WorkAddress => "workAddress",
            Self::WorkPhone => "workPhone",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownFieldError> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFieldError {
                section: WorkDetails::SECTION_NAME,
                name: s.to_string(),
            })
    }
}

impl SectionForm for WorkDetails {
    type Field = WorkField;

    const STORAGE_KEY: &'static str = "finance_work_details_data";
    const SECTION_NAME: &'static str = "work details";

    fn set_field(
        &mut self,
        field: WorkField,
        value: String,
    ) {
        let slot = match field {
            WorkField::OccupationType => &mut self.occupation_type,
            WorkField::JobTitle => &mut self.job_title,
            WorkField::MonthlyIncome => &mut self.monthly_income,
            WorkField::WorkExperience => &mut self.work_experience,
            WorkField::WorkAddress => &mut self.work_address,
            WorkField::WorkPhone => &mut self.work_phone,
        };
        *slot = value;
    }

    fn field(
        &self,
        field: WorkField,
    ) -> &str {
        match field {
            WorkField::OccupationType => &self.occupation_type,
            WorkField::JobTitle => &self.job_title,
            WorkField::MonthlyIncome => &self.monthly_income,
            WorkField::WorkExperience => &self.work_experience,
            WorkField::WorkAddress => &self.work_address,
            WorkField::WorkPhone => &self.work_phone,
        }
    }

    fn has_data(&self) -> bool {
        WorkField::ALL.iter().any(|f| !is_blank(self.field(*f)))
    }

    fn is_complete(&self) -> bool {
        WorkField::ALL.iter().all(|f| !is_blank(self.field(*f)))
    }
}
