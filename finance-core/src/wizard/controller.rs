use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth::AuthGate;
use crate::collection::{ContactInfo, DataCollection};
use crate::submit::FinancingRequestSubmitter;

use super::state::{
    DEFAULT_DUPLICATE_MESSAGE, DEFAULT_SUCCESS_MESSAGE, FailureKind, StepOutcome,
    SubmissionFailure, SubmitOutcome, WizardConfig, WizardPhase, WizardSnapshot, WizardState,
};

/// Three-step financing application flow.
///
/// Cloning gives another handle to the same wizard.
#[derive(Clone)]
pub struct FinanceWizard {
    inner: Arc<Inner>,
}

struct Inner {
    collection: DataCollection,
    submitter: Arc<FinancingRequestSubmitter>,
    auth: Arc<dyn AuthGate>,
    config: WizardConfig,
    state: Mutex<WizardState>,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
}

impl FinanceWizard {
    pub fn new(
        collection: DataCollection,
        submitter: Arc<FinancingRequestSubmitter>,
        auth: Arc<dyn AuthGate>,
        config: WizardConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                collection,
                submitter,
                auth,
                config,
                state: Mutex::new(WizardState::default()),
                pending_reset: Mutex::new(None),
            }),
        }
    }

    pub fn collection(&self) -> &DataCollection {
        &self.inner.collection
    }

    pub fn config(&self) -> &WizardConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let state = self.inner.lock();
        WizardSnapshot {
            current_step: state.current_step,
            step_count: self.inner.config.step_count,
            phase: state.phase.clone(),
            is_submitting: state.is_submitting,
            show_auth_popup: state.show_auth_popup,
        }
    }

    /// Advance one step after re-validating the session.
    pub async fn next_step(&self) -> StepOutcome {
        let authenticated = self.inner.auth.force_auth_check().await;
        self.advance(authenticated)
    }

    /// Like [`FinanceWizard::next_step`], but give a login that is still
    /// completing up to `auth_wait_timeout` to land.
    pub async fn next_step_with_wait(&self) -> StepOutcome {
        let auth = &self.inner.auth;
        let authenticated = auth.is_authenticated()
            || auth.wait_for_auth(self.inner.config.auth_wait_timeout).await;
        self.advance(authenticated)
    }

    /// Go back one step; returns the step now shown.
    pub fn previous_step(&self) -> usize {
        let mut state = self.inner.lock();
        state.current_step = state.current_step.saturating_sub(1);
        state.current_step
    }

    /// Submit the application from the last step.
    ///
    /// Ignored while a request is in flight and while the success screen
    /// is shown, until the reset returns the wizard to editing.
    ///
    /// The request runs on its own task: if the caller stops waiting, the
    /// request still completes and a success still triggers the delayed
    /// reset.
    pub async fn submit(&self) -> SubmitOutcome {
        let guard = {
            let mut state = self.inner.lock();
            let last_step = self.inner.config.step_count.saturating_sub(1);
            let succeeded = matches!(state.phase, WizardPhase::Success { .. });
            if state.is_submitting || succeeded || state.current_step != last_step {
                debug!(
                    step = state.current_step,
                    submitting = state.is_submitting,
                    succeeded,
                    "submit ignored"
                );
                return SubmitOutcome::Ignored;
            }
            state.is_submitting = true;
            state.phase = WizardPhase::Submitting;
            SubmittingGuard {
                inner: self.inner.clone(),
            }
        };

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let outcome = inner.run_submission().await;
            inner.finish(&outcome);
            drop(guard);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "submission task failed");
                let failure = SubmissionFailure::new(FailureKind::Unexpected, "");
                self.inner.lock().phase = WizardPhase::Error(failure.clone());
                SubmitOutcome::Rejected(failure)
            }
        }
    }

    /// Close the error popup. Form data is kept.
    pub fn hide_error_popup(&self) {
        let mut state = self.inner.lock();
        if matches!(state.phase, WizardPhase::Error(_)) {
            state.phase = WizardPhase::Editing;
        }
    }

    pub fn hide_auth_popup(&self) {
        self.inner.lock().show_auth_popup = false;
    }

    /// Wait for the post-success reset, if one is scheduled, to finish.
    pub async fn wait_for_reset(&self) {
        let pending = self
            .inner
            .pending_reset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                warn!(error = %e, "wizard reset task failed");
            }
        }
    }

    fn advance(
        &self,
        authenticated: bool,
    ) -> StepOutcome {
        let mut state = self.inner.lock();
        if !authenticated {
            info!(step = state.current_step, "login required to continue");
            state.show_auth_popup = true;
            return StepOutcome::AuthRequired;
        }

        if state.current_step + 1 < self.inner.config.step_count {
            state.current_step += 1;
            StepOutcome::Moved {
                step: state.current_step,
            }
        } else {
            StepOutcome::AtEnd
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run_submission(&self) -> SubmitOutcome {
        let completeness = self.collection.is_all_data_complete();
        if !completeness.is_complete {
            info!(missing = %completeness.missing_keys(), "application incomplete");
            return SubmitOutcome::Rejected(SubmissionFailure::missing(
                completeness.missing_fields,
            ));
        }

        let personal = self.collection.personal().form_data();
        let (card_front, card_back) = self.collection.uploaded_files();
        let payload = match self.collection.convert_to_financing_request_data(
            card_front,
            card_back,
            &ContactInfo::from(&personal),
        ) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "could not assemble financing request");
                return SubmitOutcome::Rejected(SubmissionFailure::new(FailureKind::Unexpected, ""));
            }
        };

        match self.submitter.submit_financing_request(&payload).await {
            Ok(response) if response.can_apply => SubmitOutcome::Accepted {
                message: response
                    .message()
                    .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
                    .to_string(),
            },
            Ok(response) => SubmitOutcome::Rejected(SubmissionFailure::new(
                FailureKind::DuplicateRequest,
                response.message().unwrap_or(DEFAULT_DUPLICATE_MESSAGE),
            )),
            Err(e) => SubmitOutcome::Rejected(SubmissionFailure::from(&e)),
        }
    }

    /// Record the outcome and, on success, schedule the reset.
    fn finish(
        self: &Arc<Self>,
        outcome: &SubmitOutcome,
    ) {
        let mut state = self.lock();
        match outcome {
            SubmitOutcome::Accepted { message } => {
                state.phase = WizardPhase::Success {
                    message: message.clone(),
                };
                drop(state);
                self.schedule_reset();
            }
            SubmitOutcome::Rejected(failure) => {
                state.phase = WizardPhase::Error(failure.clone());
            }
            SubmitOutcome::Ignored => {}
        }
    }

    fn schedule_reset(self: &Arc<Self>) {
        let inner = self.clone();
        let delay = self.config.reset_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.collection.clear_all_data().await;
            let mut state = inner.lock();
            state.current_step = 0;
            state.phase = WizardPhase::Editing;
            info!("application submitted, wizard reset");
        });
        *self
            .pending_reset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
    }
}

/// Clears `is_submitting` on every exit path.
struct SubmittingGuard {
    inner: Arc<Inner>,
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.is_submitting = false;
        if state.phase == WizardPhase::Submitting {
            warn!("submission ended without an outcome");
            state.phase = WizardPhase::Editing;
        }
    }
}
