mod controller;
mod state;

pub use controller::FinanceWizard;
pub use state::{
    DEFAULT_DUPLICATE_MESSAGE, DEFAULT_SUCCESS_MESSAGE, FailureKind, StepOutcome,
    SubmissionFailure, SubmitOutcome, WizardConfig, WizardPhase, WizardSnapshot,
};
