use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use finance_core::calculator::DEFAULT_TERM_MONTHS;

use finance_cli::app::App;
use finance_cli::commands::{self, LookupKind, Section};
use finance_cli::config::AppConfig;
use finance_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Fill in and submit a car-financing application.
///
/// Answers are saved to the configured storage between runs; attachments
/// are read at submission time.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML configuration file. Missing file means defaults.
    #[arg(long, default_value = "finance.toml")]
    config: PathBuf,

    /// Storage backend (`memory` or `sqlite`).
    #[arg(long)]
    backend: Option<String>,

    /// Storage connection string, e.g. `finance.db` or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Backend API base URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Log level or `EnvFilter` directive; `RUST_LOG` still wins.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List reference data from the backend.
    Lookups {
        #[arg(value_enum)]
        kind: LookupKind,
    },
    /// Set one form field, e.g. `set personal fullName "Mona Adel"`.
    Set {
        #[arg(value_enum)]
        section: Section,
        field: String,
        value: String,
    },
    AddCarType {
        car_type: String,
    },
    RemoveCarType {
        car_type: String,
    },
    /// Show the saved answers and what is still missing.
    Status,
    /// Quote the monthly installment for the saved car prices.
    Calculate {
        /// Car price; defaults to the saved total price.
        #[arg(long)]
        price: Option<Decimal>,
        /// Down payment; defaults to the saved down payment.
        #[arg(long)]
        down_payment: Option<Decimal>,
        #[arg(long, default_value_t = DEFAULT_TERM_MONTHS)]
        months: u32,
    },
    /// Forget all saved answers.
    Clear,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
    },
    VerifyOtp {
        email: String,
        otp: u32,
    },
    Logout,
    /// List financing requests already sent and their status.
    Requests,
    /// Send the application.
    Submit {
        #[arg(long)]
        card_front: Option<PathBuf>,
        #[arg(long)]
        card_back: Option<PathBuf>,
    },
}

impl Cli {
    fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(backend) = &self.backend {
            config.storage.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            config.storage.connection_string = db.clone();
        }
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config);
    logging::init(&config.logging)?;

    debug!(backend = %config.storage.backend, api = %config.api.base_url, "starting");
    let app = App::open(config).await?;

    let output = match cli.command {
        Command::Lookups { kind } => commands::lookups(&app, kind).await?,
        Command::Set {
            section,
            field,
            value,
        } => commands::set_field(&app, section, &field, &value).await?,
        Command::AddCarType { car_type } => commands::add_car_type(&app, &car_type).await?,
        Command::RemoveCarType { car_type } => commands::remove_car_type(&app, &car_type).await?,
        Command::Status => commands::status(&app),
        Command::Calculate {
            price,
            down_payment,
            months,
        } => commands::calculate(&app, price, down_payment, months)?,
        Command::Clear => commands::clear(&app).await,
        Command::Login { email, password } => commands::login(&app, &email, &password).await?,
        Command::Register { email } => commands::register(&app, &email).await?,
        Command::VerifyOtp { email, otp } => commands::verify_otp(&app, &email, otp).await?,
        Command::Logout => commands::logout(&app).await,
        Command::Requests => commands::requests(&app).await?,
        Command::Submit {
            card_front,
            card_back,
        } => commands::submit(&app, card_front.as_deref(), card_back.as_deref()).await?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
