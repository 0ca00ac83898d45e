mod classify;
mod multipart;
mod submitter;
mod validation;

pub use classify::{
    ClassificationRules, DUPLICATE_REQUEST_MARKER, SubmitError, TransportError, classify,
};
pub use multipart::{FormPart, MultipartForm};
pub use submitter::{FinancingRequestSubmitter, FinancingTransport};
pub use validation::{
    ALLOWED_IMAGE_TYPES, CardSide, DEFAULT_MAX_UPLOAD_BYTES, FileValidationError, validate_upload,
};
