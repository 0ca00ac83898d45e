use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

/// Shape shared by the three financing form sections.
///
/// Each section is a plain snapshot of string fields (plus the odd list)
/// that can be persisted as JSON under its own storage key and judged for
/// completeness on its own.
pub trait SectionForm:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Addressable scalar fields of this section.
    type Field: Copy + fmt::Debug + Send + Sync + 'static;

    /// Key under which the snapshot is persisted.
    const STORAGE_KEY: &'static str;

    /// Short name used in logs.
    const SECTION_NAME: &'static str;

    /// Replace one scalar field.
    fn set_field(
        &mut self,
        field: Self::Field,
        value: String,
    );

    /// Read one scalar field.
    fn field(
        &self,
        field: Self::Field,
    ) -> &str;

    /// `true` when at least one field carries user input.
    fn has_data(&self) -> bool;

    /// Section-specific completeness rule.
    fn is_complete(&self) -> bool;
}

/// `true` for empty or whitespace-only input.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Error returned when a field name does not belong to a section.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {section} field '{name}'")]
pub struct UnknownFieldError {
    pub section: &'static str,
    pub name: String,
}
