use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use tracing::{debug, info};

use finance_core::auth::AuthGate;
use finance_core::calculator::{InstallmentRequest, calculate_installment};
use finance_core::models::{PersonalField, ReferenceField, UploadFile, WorkField};
use rust_decimal::Decimal;
use finance_core::wizard::{StepOutcome, SubmitOutcome};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Personal,
    Work,
    Car,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupKind {
    Governorates,
    CarModels,
    Universities,
    Faculties,
}

// ── reference data ───────────────────────────────────────────────────────

pub async fn lookups(
    app: &App,
    kind: LookupKind,
) -> Result<String> {
    let mut out = String::new();
    match kind {
        LookupKind::Governorates => {
            for g in app.governorates.load().await {
                writeln!(out, "{:>3}  {}", g.id, g.name)?;
            }
        }
        LookupKind::CarModels => {
            app.car_models.load().await.context("cannot load car models")?;
            for (brand, models) in app.car_models.grouped() {
                let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
                writeln!(out, "{brand}: {}", names.join(", "))?;
            }
        }
        LookupKind::Universities => {
            let universities = app
                .universities
                .load_universities()
                .await
                .context("cannot load universities")?;
            for u in universities {
                writeln!(out, "{:>3}  {}", u.id, u.name)?;
            }
        }
        LookupKind::Faculties => {
            let faculties = app
                .universities
                .load_faculties()
                .await
                .context("cannot load faculties")?;
            for f in faculties {
                writeln!(out, "{:>3}  {} (university {})", f.id, f.name, f.university_id)?;
            }
        }
    }
    Ok(out)
}

// ── form editing ─────────────────────────────────────────────────────────

pub async fn set_field(
    app: &App,
    section: Section,
    field: &str,
    value: &str,
) -> Result<String> {
    let collection = app.collection();
    match section {
        Section::Personal => {
            collection
                .personal()
                .update_field(PersonalField::parse(field)?, value)
                .await
        }
        Section::Work => {
            collection
                .work()
                .update_field(WorkField::parse(field)?, value)
                .await
        }
        Section::Car => {
            collection
                .reference()
                .update_field(ReferenceField::parse(field)?, value)
                .await
        }
    }
    debug!(?section, field, "field updated");
    Ok(format!("{field} = {value}"))
}

pub async fn add_car_type(
    app: &App,
    car_type: &str,
) -> Result<String> {
    let reference = app.collection().reference();
    reference.add_car_type(car_type).await;
    Ok(format!(
        "Car types: {}",
        reference.form_data().selected_car_types.join(", ")
    ))
}

pub async fn remove_car_type(
    app: &App,
    car_type: &str,
) -> Result<String> {
    let reference = app.collection().reference();
    reference.remove_car_type(car_type).await;
    Ok(format!(
        "Car types: {}",
        reference.form_data().selected_car_types.join(", ")
    ))
}

pub fn status(app: &App) -> String {
    let login = match app.session.user() {
        Some(user) if app.session.is_authenticated() => format!("Logged in as {}", user.email),
        _ if app.session.is_authenticated() => "Logged in".to_string(),
        _ => "Not logged in".to_string(),
    };
    format!("{login}\n\n{}", app.collection().summary())
}

pub async fn clear(app: &App) -> String {
    app.collection().clear_all_data().await;
    "Saved answers cleared".to_string()
}

/// Installment quote for the saved car prices; `price` and `down_payment`
/// replace the saved values when given.
pub fn calculate(
    app: &App,
    price: Option<Decimal>,
    down_payment: Option<Decimal>,
    months: u32,
) -> Result<String> {
    let car = app.collection().reference().form_data();
    let mut request = InstallmentRequest::from_car_section(&car, months);
    if let Some(price) = price {
        request.car_price = price;
    }
    if let Some(down_payment) = down_payment {
        request.down_payment = down_payment;
    }

    let quote = calculate_installment(&request).context("cannot calculate installment")?;
    let mut out = String::new();
    writeln!(out, "Car price:           {:.2}", quote.car_price)?;
    writeln!(out, "Down payment:        {:.2}", quote.down_payment)?;
    writeln!(out, "Loan amount:         {:.2}", quote.loan_amount)?;
    writeln!(
        out,
        "Interest ({months} months): {:.2}% = {:.2}",
        quote.interest_percent, quote.interest_amount
    )?;
    writeln!(out, "Total to pay:        {:.2}", quote.total_to_pay)?;
    writeln!(out, "Monthly installment: {:.2}", quote.monthly_installment)?;
    Ok(out)
}

// ── session ──────────────────────────────────────────────────────────────

pub async fn login(
    app: &App,
    email: &str,
    password: &str,
) -> Result<String> {
    let response = app.auth.login(email, password).await.context("login failed")?;
    Ok(format!("Logged in as {}", response.user.name))
}

pub async fn register(
    app: &App,
    email: &str,
) -> Result<String> {
    let response = app.auth.register(email).await.context("registration failed")?;
    Ok(response
        .message
        .unwrap_or_else(|| format!("Verification code sent to {email}")))
}

pub async fn verify_otp(
    app: &App,
    email: &str,
    otp: u32,
) -> Result<String> {
    let response = app
        .auth
        .verify_otp(email, otp)
        .await
        .context("verification failed")?;
    Ok(format!("Logged in as {}", response.user.name))
}

/// The applicant's earlier financing requests.
pub async fn requests(app: &App) -> Result<String> {
    if !app.session.force_auth_check().await {
        bail!("Login required: run `finance login` first");
    }

    let listing = app
        .backend
        .fetch_financing_requests()
        .await
        .context("cannot load financing requests")?;

    let mut out = String::new();
    if listing.data.is_empty() {
        writeln!(out, "No financing requests yet")?;
    }
    for r in &listing.data {
        writeln!(
            out,
            "{:>4}  {:<10} {} {} {}  {}  ({})",
            r.id, r.status, r.brand, r.model, r.year, r.price, r.created_at
        )?;
    }
    if let Some(page) = listing.pagination {
        writeln!(
            out,
            "Page {} of {}, {} in total",
            page.current_page, page.last_page, page.total
        )?;
    }
    if listing.can_apply {
        writeln!(out, "You can apply for a new financing request")?;
    } else {
        writeln!(out, "A financing request is still in process")?;
    }
    Ok(out)
}

pub async fn logout(app: &App) -> String {
    app.auth.logout().await;
    "Logged out".to_string()
}

// ── submission ───────────────────────────────────────────────────────────

pub fn read_attachment(path: &Path) -> Result<UploadFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("cannot read attachment '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = UploadFile::mime_for_file_name(&file_name);
    Ok(UploadFile::new(file_name, mime_type, bytes))
}

/// Walk the wizard to its last step and submit.
///
/// On success this waits out the reset delay, after which the saved
/// answers are gone.
pub async fn submit(
    app: &App,
    card_front: Option<&Path>,
    card_back: Option<&Path>,
) -> Result<String> {
    let personal = app.collection().personal();
    if let Some(path) = card_front {
        personal.upload_card_front(Some(read_attachment(path)?)).await;
    }
    if let Some(path) = card_back {
        personal.upload_card_back(Some(read_attachment(path)?)).await;
    }

    // The first step re-validates the saved session so a malformed token
    // fails here instead of at the server.
    let mut outcome = app.wizard.next_step().await;
    loop {
        match outcome {
            StepOutcome::Moved { step } => debug!(step, "advanced"),
            StepOutcome::AtEnd => break,
            StepOutcome::AuthRequired => bail!("Login required: run `finance login` first"),
        }
        outcome = app.wizard.next_step_with_wait().await;
    }

    match app.wizard.submit().await {
        SubmitOutcome::Accepted { message } => {
            info!(delay = ?app.wizard.config().reset_delay, "waiting for wizard reset");
            app.wizard.wait_for_reset().await;
            Ok(message)
        }
        SubmitOutcome::Rejected(failure) => {
            let mut text = failure.kind.title_key().to_string();
            if !failure.message.is_empty() {
                write!(text, ": {}", failure.message)?;
            }
            if !failure.missing_fields.is_empty() {
                let keys: Vec<&str> = failure.missing_fields.iter().map(|f| f.as_key()).collect();
                write!(text, " [{}]", keys.join(", "))?;
            }
            bail!(text)
        }
        SubmitOutcome::Ignored => bail!("A submission is already in progress"),
    }
}
