use std::time::Duration;

use crate::collection::MissingField;
use crate::submit::SubmitError;

/// Shown when the server accepts a request without a message of its own.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "FINANCING_REQUEST_SENT_SUCCESSFULLY";

/// Shown when the server refuses a duplicate without a message of its own.
pub const DEFAULT_DUPLICATE_MESSAGE: &str = "ALREADY_HAVE_FINANCING_REQUEST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    pub step_count: usize,
    /// How long the success screen stays before the forms are wiped.
    pub reset_delay: Duration,
    /// Upper bound for [`crate::wizard::FinanceWizard::next_step_with_wait`].
    pub auth_wait_timeout: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            step_count: 3,
            reset_delay: Duration::from_millis(3000),
            auth_wait_timeout: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingFields,
    DuplicateRequest,
    AuthRequired,
    Validation,
    SendFailed,
    Unexpected,
}

impl FailureKind {
    /// Translation key for the error popup title.
    pub fn title_key(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_REQUIRED_FIELDS",
            Self::DuplicateRequest => "FINANCING_REQUEST_EXISTS",
            Self::AuthRequired => "LOGIN_REQUIRED_TITLE",
            Self::Validation => "ERROR_IN_ENTERED_DATA",
            Self::SendFailed => "ERROR_IN_SENDING",
            Self::Unexpected => "UNEXPECTED_ERROR",
        }
    }

    /// Local problems are the applicant's to fix; the rest came back from
    /// the server or the network.
    pub fn is_server_error(&self) -> bool {
        !matches!(self, Self::MissingFields)
    }
}

/// What the error popup shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub message: String,
    pub missing_fields: Vec<MissingField>,
}

impl SubmissionFailure {
    pub fn missing(fields: Vec<MissingField>) -> Self {
        Self {
            kind: FailureKind::MissingFields,
            message: String::new(),
            missing_fields: fields,
        }
    }

    pub fn new(
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }
}

impl From<&SubmitError> for SubmissionFailure {
    fn from(error: &SubmitError) -> Self {
        match error {
            SubmitError::AuthenticationRequired => Self::new(FailureKind::AuthRequired, ""),
            SubmitError::AlreadyInProgress(message) => {
                Self::new(FailureKind::DuplicateRequest, message.as_str())
            }
            SubmitError::Validation(_) => Self::new(FailureKind::Validation, error.to_string()),
            SubmitError::InvalidAttachment { .. }
            | SubmitError::BadRequest(_)
            | SubmitError::Server
            | SubmitError::Network(_)
            | SubmitError::Other { .. } => Self::new(FailureKind::SendFailed, error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    Editing,
    Submitting,
    Success { message: String },
    Error(SubmissionFailure),
}

/// Point-in-time view of the wizard for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSnapshot {
    pub current_step: usize,
    pub step_count: usize,
    pub phase: WizardPhase,
    pub is_submitting: bool,
    pub show_auth_popup: bool,
}

impl WizardSnapshot {
    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.step_count
    }

    pub fn show_error_popup(&self) -> bool {
        matches!(self.phase, WizardPhase::Error(_))
    }
}

/// Result of a forward navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { step: usize },
    /// Already on the last step; nothing changed.
    AtEnd,
    /// Not logged in; the auth popup is now showing.
    AuthRequired,
}

/// Result of [`crate::wizard::FinanceWizard::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not on the last step, or a submission is already running.
    Ignored,
    Accepted { message: String },
    Rejected(SubmissionFailure),
}

#[derive(Debug, Clone)]
pub(crate) struct WizardState {
    pub(crate) current_step: usize,
    pub(crate) phase: WizardPhase,
    pub(crate) is_submitting: bool,
    pub(crate) show_auth_popup: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: 0,
            phase: WizardPhase::Editing,
            is_submitting: false,
            show_auth_popup: false,
        }
    }
}
