//! Car-financing application client: form sections, reference-data
//! caches, request assembly and submission, and the wizard that drives
//! them. Transports and storage backends plug in through traits.

pub mod auth;
pub mod calculator;
pub mod collection;
pub mod lookup;
pub mod models;
pub mod storage;
pub mod store;
pub mod submit;
pub mod wizard;

pub use auth::{AuthGate, TokenSession};
pub use calculator::{InstallmentQuote, InstallmentRequest, calculate_installment};
pub use collection::{Completeness, ContactInfo, DataCollection, MissingField};
pub use lookup::{CarModelCache, GovernorateCache, LookupError, LookupSource, UniversityCache};
pub use models::*;
pub use storage::{KeyValueStore, StorageConfig, StorageError, StorageFactory, StorageRegistry};
pub use submit::{FinancingRequestSubmitter, FinancingTransport, SubmitError, TransportError};
pub use wizard::{FinanceWizard, SubmitOutcome, WizardConfig, WizardPhase, WizardSnapshot};
