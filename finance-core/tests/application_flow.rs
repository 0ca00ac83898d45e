use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use finance_core::auth::AuthGate;
use finance_core::collection::{ContactInfo, DataCollection};
use finance_core::models::{
    FinancingRequestResponse, PersonalField, ReferenceField, UploadFile, WorkField,
};
use finance_core::storage::MemoryStore;
use finance_core::submit::{
    CardSide, FinancingRequestSubmitter, FinancingTransport, MultipartForm, SubmitError,
    TransportError,
};
use finance_core::wizard::{
    FailureKind, FinanceWizard, StepOutcome, SubmitOutcome, WizardConfig, WizardPhase,
};

// ── collaborators ────────────────────────────────────────────────────────

struct LoggedIn;

#[async_trait]
impl AuthGate for LoggedIn {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn force_auth_check(&self) -> bool {
        true
    }
}

struct ScriptedServer {
    reply: Result<FinancingRequestResponse, TransportError>,
    forms: Mutex<Vec<MultipartForm>>,
    calls: AtomicUsize,
}

impl ScriptedServer {
    fn answering(reply: Result<FinancingRequestResponse, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            forms: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FinancingTransport for ScriptedServer {
    async fn send_financing_request(
        &self,
        form: MultipartForm,
    ) -> Result<FinancingRequestResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.forms.lock().unwrap().push(form);
        self.reply.clone()
    }
}

fn answer(
    can_apply: bool,
    message: Option<&str>,
) -> Result<FinancingRequestResponse, TransportError> {
    Ok(FinancingRequestResponse {
        can_apply,
        message: message.map(str::to_string),
        data: None,
        errors: None,
    })
}

async fn wizard_for(server: Arc<ScriptedServer>) -> FinanceWizard {
    let collection = DataCollection::load(Arc::new(MemoryStore::new())).await;
    FinanceWizard::new(
        collection,
        Arc::new(FinancingRequestSubmitter::new(server)),
        Arc::new(LoggedIn),
        WizardConfig::default(),
    )
}

async fn fill_ahmed(collection: &DataCollection) {
    let personal = collection.personal();
    personal.update_field(PersonalField::FullName, "Ahmed Ali").await;
    personal.update_field(PersonalField::PhoneNumber, "01012345678").await;
    personal.update_field(PersonalField::Email, "a@x.com").await;
    personal.update_field(PersonalField::Governorate, "Cairo").await;

    let work = collection.work();
    work.update_field(WorkField::OccupationType, "employee").await;
    work.update_field(WorkField::JobTitle, "Accountant").await;
    work.update_field(WorkField::MonthlyIncome, "15000").await;
    work.update_field(WorkField::WorkExperience, "5").await;
    work.update_field(WorkField::WorkAddress, "Nasr City").await;
    work.update_field(WorkField::WorkPhone, "0222222222").await;

    let car = collection.reference();
    car.update_field(ReferenceField::TotalPrice, "300000").await;
    car.update_field(ReferenceField::DownPayment, "50000").await;
    car.update_field(ReferenceField::HasSpecificCar, "yes").await;
    car.update_field(ReferenceField::SpecificCarBrand, "Toyota").await;
    car.update_field(ReferenceField::SpecificCarModel, "Corolla").await;
    car.update_field(ReferenceField::SpecificCarYear, "2022").await;
    car.update_field(ReferenceField::SpecificCarPrice, "300000").await;
}

async fn walk_to_last_step(wizard: &FinanceWizard) {
    assert_eq!(wizard.next_step().await, StepOutcome::Moved { step: 1 });
    assert_eq!(wizard.next_step().await, StepOutcome::Moved { step: 2 });
    assert_eq!(wizard.next_step().await, StepOutcome::AtEnd);
}

// ── happy path ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn accepted_application_is_wiped_after_the_success_screen() {
    let server = ScriptedServer::answering(answer(true, None));
    let wizard = wizard_for(server.clone()).await;
    let collection = wizard.collection().clone();
    fill_ahmed(&collection).await;

    let completeness = collection.is_all_data_complete();
    assert!(completeness.is_complete);
    assert!(completeness.missing_fields.is_empty());

    let personal = collection.personal().form_data();
    let payload = collection
        .convert_to_financing_request_data(None, None, &ContactInfo::from(&personal))
        .unwrap();
    assert_eq!(payload.governorate_id, 1);
    assert_eq!(payload.car_brand, "Toyota");
    assert_eq!(payload.car_price, dec!(300000));

    walk_to_last_step(&wizard).await;
    let outcome = wizard.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
    assert!(matches!(wizard.snapshot().phase, WizardPhase::Success { .. }));

    let form = server.forms.lock().unwrap().remove(0);
    assert_eq!(form.text_value("governorate_id"), Some("1"));
    assert_eq!(form.text_value("car_brand"), Some("Toyota"));
    assert_eq!(form.text_value("car_price"), Some("300000"));
    assert!(form.file_part("card_front").is_none());
    assert!(form.file_part("card_back").is_none());

    tokio::time::sleep(Duration::from_millis(3000)).await;
    wizard.wait_for_reset().await;

    assert_eq!(wizard.snapshot().current_step, 0);
    assert!(!collection.personal().has_data());
    assert!(!collection.work().has_data());
    assert!(!collection.reference().has_data());
}

// ── duplicate request ────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_request_shows_the_server_wording() {
    let message = "لديك بالفعل طلب تمويل";
    let server = ScriptedServer::answering(answer(false, Some(message)));
    let wizard = wizard_for(server).await;
    fill_ahmed(wizard.collection()).await;
    walk_to_last_step(&wizard).await;

    let outcome = wizard.submit().await;

    let failure = match outcome {
        SubmitOutcome::Rejected(failure) => failure,
        other => panic!("expected a rejection, got {other:?}"),
    };
    assert_eq!(failure.kind, FailureKind::DuplicateRequest);
    assert_eq!(failure.message, message);
    assert!(wizard.snapshot().show_error_popup());
    assert!(wizard.collection().personal().has_data());
}

// ── oversized attachment ─────────────────────────────────────────────────

#[tokio::test]
async fn oversized_card_is_refused_before_sending() {
    let server = ScriptedServer::answering(answer(true, None));
    let wizard = wizard_for(server.clone()).await;
    fill_ahmed(wizard.collection()).await;
    wizard
        .collection()
        .personal()
        .upload_card_front(Some(UploadFile::new(
            "front.jpg",
            "image/jpeg",
            vec![0; 5 * 1024 * 1024],
        )))
        .await;
    walk_to_last_step(&wizard).await;

    let outcome = wizard.submit().await;

    let failure = match outcome {
        SubmitOutcome::Rejected(failure) => failure,
        other => panic!("expected a rejection, got {other:?}"),
    };
    assert_eq!(failure.kind, FailureKind::SendFailed);
    assert!(failure.message.contains("Card front"));
    assert!(failure.message.contains("4MB"));
    assert_eq!(server.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submitter_names_the_offending_side() {
    let server = ScriptedServer::answering(answer(true, None));
    let submitter = FinancingRequestSubmitter::new(server.clone());
    let collection = DataCollection::load(Arc::new(MemoryStore::new())).await;
    fill_ahmed(&collection).await;
    let personal = collection.personal().form_data();
    let payload = collection
        .convert_to_financing_request_data(
            None,
            Some(UploadFile::new("back.gif", "image/gif", vec![1, 2, 3])),
            &ContactInfo::from(&personal),
        )
        .unwrap();

    let err = submitter.submit_financing_request(&payload).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::InvalidAttachment {
            side: CardSide::Back,
            ..
        }
    ));
    assert_eq!(server.calls.load(Ordering::SeqCst), 0);
}
