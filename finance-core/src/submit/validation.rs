use std::fmt;

use thiserror::Error;

use crate::models::UploadFile;

/// Largest accepted ID card photo.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

/// MIME types accepted for ID card photos.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Front => "Card front",
            Self::Back => "Card back",
        }
    }

    /// Multipart field carrying this side.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Front => "card_front",
            Self::Back => "card_back",
        }
    }
}

impl fmt::Display for CardSide {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileValidationError {
    #[error("File size must be less than {}MB", megabytes(.max_bytes))]
    TooLarge { size: u64, max_bytes: u64 },

    #[error("Only JPEG, PNG, and WebP images are allowed")]
    UnsupportedType { mime_type: String },
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Size is checked before type.
pub fn validate_upload(
    file: &UploadFile,
    max_bytes: u64,
) -> Result<(), FileValidationError> {
    let size = file.size();
    if size > max_bytes {
        return Err(FileValidationError::TooLarge { size, max_bytes });
    }

    if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        return Err(FileValidationError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }

    Ok(())
}
