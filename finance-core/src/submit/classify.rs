use thiserror::Error;

use crate::models::ErrorBody;

use super::validation::{CardSide, FileValidationError};

/// Marker the backend puts in a 400 message when the applicant already
/// has a request being processed.
pub const DUPLICATE_REQUEST_MARKER: &str = "already have a financing request in process";

/// A failed exchange as reported by the transport.
///
/// `status == 0` means no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub status: u16,
    pub message: String,
    pub body: Option<ErrorBody>,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
            body: None,
        }
    }

    pub fn http(
        status: u16,
        message: impl Into<String>,
        body: Option<ErrorBody>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            body,
        }
    }

    fn server_message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Substrings that turn a 400 into a duplicate-request outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRules {
    pub duplicate_markers: Vec<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            duplicate_markers: vec![DUPLICATE_REQUEST_MARKER.to_string()],
        }
    }
}

impl ClassificationRules {
    fn is_duplicate(
        &self,
        message: &str,
    ) -> bool {
        self.duplicate_markers
            .iter()
            .any(|marker| message.contains(marker.as_str()))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{side} validation failed: {source}")]
    InvalidAttachment {
        side: CardSide,
        #[source]
        source: FileValidationError,
    },

    #[error("Login required. Please log in to submit a financing request.")]
    AuthenticationRequired,

    /// Carries the server's own wording.
    #[error("{0}")]
    AlreadyInProgress(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error. Please try again in 5 minutes.")]
    Server,

    #[error("Network error. Please check your internet connection.")]
    Network(String),

    #[error("Server error: {status} - {message}")]
    Other { status: u16, message: String },
}

/// Map a transport failure onto a submission outcome.
pub fn classify(
    error: TransportError,
    rules: &ClassificationRules,
) -> SubmitError {
    match error.status {
        401 => SubmitError::AuthenticationRequired,
        400 => match error.server_message() {
            Some(message) if rules.is_duplicate(message) => {
                SubmitError::AlreadyInProgress(message.to_string())
            }
            Some(message) => SubmitError::BadRequest(message.to_string()),
            None => SubmitError::BadRequest("Bad request".to_string()),
        },
        422 => SubmitError::Validation(validation_message(&error)),
        500 => SubmitError::Server,
        0 => SubmitError::Network(error.message),
        status => SubmitError::Other {
            status,
            message: error.message,
        },
    }
}

fn validation_message(error: &TransportError) -> String {
    let field_errors = error
        .body
        .as_ref()
        .and_then(|b| b.errors.as_ref())
        .filter(|errors| !errors.is_empty());

    if let Some(errors) = field_errors {
        // BTreeMap keeps fields sorted.
        let joined = errors
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        return format!("Validation errors: {joined}");
    }

    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| "Data validation failed. Please review the entered data.".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn with_message(
        status: u16,
        message: &str,
    ) -> TransportError {
        TransportError::http(
            status,
            "Bad Request",
            Some(ErrorBody {
                message: Some(message.to_string()),
                errors: None,
            }),
        )
    }

    #[test]
    fn unauthorized_requires_login() {
        let err = classify(TransportError::http(401, "Unauthorized", None), &ClassificationRules::default());
        assert_eq!(err, SubmitError::AuthenticationRequired);
    }

    #[test]
    fn duplicate_marker_keeps_server_wording() {
        let message = "You already have a financing request in process.";
        let err = classify(with_message(400, message), &ClassificationRules::default());
        assert_eq!(err, SubmitError::AlreadyInProgress(message.to_string()));
    }

    #[test]
    fn custom_markers_are_honoured() {
        let rules = ClassificationRules {
            duplicate_markers: vec!["طلب قيد المعالجة".to_string()],
        };
        let err = classify(with_message(400, "لديك طلب قيد المعالجة"), &rules);
        assert!(matches!(err, SubmitError::AlreadyInProgress(_)));

        let err = classify(
            with_message(400, "You already have a financing request in process"),
            &rules,
        );
        assert!(matches!(err, SubmitError::BadRequest(_)));
    }

    #[test]
    fn plain_bad_request_uses_server_message_or_generic_text() {
        let rules = ClassificationRules::default();
        assert_eq!(
            classify(with_message(400, "phone_number is invalid"), &rules),
            SubmitError::BadRequest("phone_number is invalid".to_string())
        );
        assert_eq!(
            classify(TransportError::http(400, "Bad Request", None), &rules),
            SubmitError::BadRequest("Bad request".to_string())
        );
    }

    #[test]
    fn unprocessable_lists_field_errors_sorted() {
        let mut errors = BTreeMap::new();
        errors.insert("phone_number".to_string(), vec!["is required".to_string()]);
        errors.insert(
            "car_price".to_string(),
            vec!["must be a number".to_string(), "must be positive".to_string()],
        );
        let error = TransportError::http(
            422,
            "Unprocessable Content",
            Some(ErrorBody {
                message: Some("The given data was invalid.".to_string()),
                errors: Some(errors),
            }),
        );

        assert_eq!(
            classify(error, &ClassificationRules::default()).to_string(),
            "Validation errors: car_price: must be a number, must be positive; phone_number: is required"
        );
    }

    #[test]
    fn unprocessable_without_field_errors_falls_back() {
        let rules = ClassificationRules::default();
        assert_eq!(
            classify(with_message(422, "Invalid data"), &rules),
            SubmitError::Validation("Invalid data".to_string())
        );
        assert_eq!(
            classify(TransportError::http(422, "Unprocessable", None), &rules),
            SubmitError::Validation("Data validation failed. Please review the entered data.".to_string())
        );
    }

    #[test]
    fn transient_failures() {
        let rules = ClassificationRules::default();
        assert_eq!(
            classify(TransportError::http(500, "Internal Server Error", None), &rules),
            SubmitError::Server
        );
        assert!(matches!(
            classify(TransportError::network("dns failure"), &rules),
            SubmitError::Network(_)
        ));
        assert_eq!(
            classify(TransportError::http(503, "Service Unavailable", None), &rules).to_string(),
            "Server error: 503 - Service Unavailable"
        );
    }

    #[test]
    fn attachment_error_names_the_side() {
        let err = SubmitError::InvalidAttachment {
            side: CardSide::Back,
            source: FileValidationError::UnsupportedType {
                mime_type: "image/gif".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Card back validation failed: Only JPEG, PNG, and WebP images are allowed"
        );
    }
}
