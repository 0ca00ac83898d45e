use crate::models::UploadFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File(UploadFile),
}

/// Transport-neutral multipart body: named parts in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> &mut Self {
        self.parts.push((name.to_string(), FormPart::Text(value.into())));
        self
    }

    pub fn file(
        &mut self,
        name: &str,
        file: UploadFile,
    ) -> &mut Self {
        self.parts.push((name.to_string(), FormPart::File(file)));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, FormPart)> {
        self.parts
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// First text part with this name.
    pub fn text_value(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn file_part(
        &self,
        name: &str,
    ) -> Option<&UploadFile> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::File(file) if n == name => Some(file),
            _ => None,
        })
    }
}
